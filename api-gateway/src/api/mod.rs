//! API handlers
//!
//! Handlers extract state and parameters, call the services and map the
//! result into the standardized response format. Trade rejections are
//! regular `200` payloads; only faults become error responses.

pub mod account;
pub mod response;
pub mod trade;

pub use response::{ApiListResponse, ApiResponse};
