//! Data Transfer Objects
//!
//! Wire shapes exchanged with the control plane and with callers of the
//! agent's HTTP API. Every response uses the `{code, msg, payload}` envelope.

pub mod api;
pub mod task;
pub mod webhook;

/// Response code of a successful request
pub const CODE_SUCCESS: i32 = 0;

/// Response code of a request rejected because of its content
pub const CODE_CLIENT_ERROR: i32 = 400;

/// Response code of a request that failed on the serving side
pub const CODE_SERVER_ERROR: i32 = 500;

/// Message sent alongside [`CODE_CLIENT_ERROR`] when no detail is available
pub const MSG_CLIENT_ERROR: &str = "client error";
