//! Service layer
//!
//! Services contain the agent's business logic: running build and deploy
//! tasks against the runtime and source-control collaborators, and reporting
//! task status back to the control plane.
//!
//! All services are trait-based to enable testing and dependency injection.

mod execution;
mod reporter;

// Re-export traits
pub use execution::ExecutionService;
pub use reporter::StatusReporter;

// Re-export implementations
pub use execution::{ExecutionError, ExecutionSettings, StandardExecutionService};
pub use reporter::{ControlPlaneReporter, RetryPolicy};
