//! Hireflow: task lifecycle and assignment engine for onboarding workflows.
//!
//! This crate owns the rules that move onboarding work items between
//! unassigned, claimed, flagged, overdue and completed, including the
//! single-writer-wins guarantee when two staff members claim the same
//! unassigned task at once.
//!
//! # Architecture
//!
//! Hireflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, logging, etc.)
//!
//! # Modules
//!
//! - [`task`]: Task state machine, claim guard, bucketing and orchestration
//! - [`config`]: Layered engine configuration
//! - [`telemetry`]: Tracing subscriber installation

pub mod config;
pub mod task;
pub mod telemetry;
