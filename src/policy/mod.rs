//! Lease decision and remaining-time computation.

pub mod access;
pub mod remaining;
