//! Scheduler layer for the agent
//!
//! This layer turns an accepted webhook into a running task: it arms the
//! timeout timer, reports progress, launches execution and makes sure exactly
//! one terminal status is reported.

mod gate;
mod orchestrator;
mod timer;

pub use orchestrator::TaskOrchestrator;
