//! Deploybot Core
//!
//! Core types shared by the Deploybot agent and its control-plane client.
//!
//! This crate contains:
//! - Domain types: Tasks, their typed configurations, events and host info
//! - DTOs: Wire shapes exchanged with the control plane and webhook callers
//! - The event queue the agent's webhook intake feeds

pub mod domain;
pub mod dto;
pub mod queue;
