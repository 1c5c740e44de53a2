//! Procedure-call transport for chirp.
//!
//! Callers hand in an operation name, a JSON payload and the viewer resolved
//! by their auth layer; every call returns an [`ApiResponse`] envelope.

mod api;
mod error;

pub use api::{Api, ApiResponse, Operation};
pub use error::{ApiError, ErrorCode};
