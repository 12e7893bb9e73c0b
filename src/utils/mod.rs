//! Shared utilities

pub mod error;

pub use error::{OrchestratorError, Result};
