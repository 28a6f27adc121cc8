//! HTTP Request domain types

mod body;
mod header;
mod method;
mod spec;

pub use body::{EncodedBody, RequestBody};
pub use header::HeaderMap;
pub use method::HttpMethod;
pub use spec::RequestSpec;
