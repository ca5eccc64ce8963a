//! Optimistic update module (ergonomic namespace)
//! - update.rs: the `Mutation` strategy trait and the closure-backed descriptor
//! - coordinator.rs: state ownership and reconciliation
//! - factories.rs: ready-made descriptors for common mutation shapes

pub mod coordinator;
pub mod factories;
pub mod update;

pub use coordinator::*;
pub use update::*;
