//! Terminal status gate

use deploybot_core::domain::task::TaskStatus;
use std::sync::OnceLock;

/// Single-assignment slot for a task's terminal status
///
/// The timeout timer and the execution both try to claim the gate; only the
/// first claim succeeds and is allowed to report.
#[derive(Debug, Default)]
pub struct TerminalGate {
    status: OnceLock<TaskStatus>,
}

impl TerminalGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate for `status`, returning false when already claimed
    ///
    /// Non-terminal statuses never claim the gate.
    pub fn claim(&self, status: TaskStatus) -> bool {
        status.is_terminal() && self.status.set(status).is_ok()
    }

    /// The status that won the gate, if any
    pub fn winner(&self) -> Option<TaskStatus> {
        self.status.get().copied()
    }
}
