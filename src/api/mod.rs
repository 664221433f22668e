// src/api/mod.rs
// HTTP surface: handlers, SSE relay and error mapping

pub mod error;
pub mod http;
pub mod relay;

pub use error::{ApiError, ApiResult};
