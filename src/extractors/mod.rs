//! Request extractors whose failures render as the standard error body.

pub mod id;
pub mod json;

pub use id::parse_id;
pub use json::JsonBody;
