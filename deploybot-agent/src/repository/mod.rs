//! Repository layer
//!
//! Repositories are stateless HTTP clients that abstract communication with
//! the control plane. They carry no business logic, and are trait-based so the
//! intake and reporting paths can be tested against a fake.

#[cfg(test)]
mod fake;
mod tasks;

pub use tasks::TaskRepository;

pub use tasks::HttpTaskRepository;

#[cfg(test)]
pub use fake::FakeTaskRepository;
