//! Client side of the token protocol.

pub mod http;

pub use http::LeaseClient;
