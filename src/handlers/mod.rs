//! HTTP handlers: one module per resource plus health checks.

pub mod media;
pub mod page;
pub mod post;
