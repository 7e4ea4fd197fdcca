//! Token endpoint request/response shapes.

pub mod models;
pub mod timestamp;
