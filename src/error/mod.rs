//! Error Handling Module
//!
//! This module provides the crate error type, the retryability
//! classification the retry engine keys on, and conversions from
//! common error types.

mod conversions;
pub mod types;

pub use types::*;
