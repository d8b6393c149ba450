//! Core types and traits for orbitfile.
//!
//! This crate provides the data model shared by the background file-operation
//! executors and the render loop that owns the process list: operation
//! records, the progress events that carry them across the channel, and the
//! engine configuration.

mod config;
mod error;
mod operation;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::EngineError;
pub use operation::{Operation, OperationId, OperationKind, OperationState, ProgressEvent};
