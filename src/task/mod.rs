//! Task lifecycle management for onboarding work items.
//!
//! Tasks are created by staff or by external triggers (a hire finishing an
//! onboarding step produces an unassigned review task), claimed by staff,
//! flagged for review, resolved and completed. Overdue is never written; it
//! is derived at read time when tasks are bucketed for dashboards. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Field mapping between records and tasks in [`mapping`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod mapping;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
