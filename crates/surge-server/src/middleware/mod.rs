//! Tower middleware applied to every request.
//!
//! - `RequestIdLayer`: generates or propagates `x-request-id`
//! - `LoggingLayer`: one span per request, with completion status and latency

mod logging;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdMiddleware};
