//! Adapter implementations for task lifecycle ports.

pub mod logging;
pub mod memory;
pub mod postgres;
