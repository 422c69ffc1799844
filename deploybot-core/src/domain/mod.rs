//! Core domain types
//!
//! Types describing the work the agent performs. Tasks are owned by the
//! control plane and only ever read by the agent; events and host info are
//! produced locally.

pub mod event;
pub mod host;
pub mod task;
