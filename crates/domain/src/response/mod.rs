//! HTTP response domain types

mod status;

pub use status::{StatusClass, StatusCode};
