//! Render-loop side of orbitfile.
//!
//! # Overview
//!
//! The [`Engine`] is built once at startup and owned by the task that draws
//! the screen. It holds:
//!
//! - **Process registry** - every operation in start order, with a cursor and
//!   a render window for the virtualized process list
//! - **Clipboard** - the pending copy or cut selection
//! - **Dispatcher** - turns an [`Action`] plus a selection into a registered
//!   operation and a background executor
//! - **Progress receiver** - the single consumer of executor updates
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use orbitfile_core::EngineConfig;
//! use orbitfile_tui::{Action, Engine};
//!
//! # async fn demo() -> Result<(), orbitfile_core::EngineError> {
//! let mut engine = Engine::new(EngineConfig::default())?;
//! let selection = vec![PathBuf::from("/tmp/report.pdf")];
//! engine.dispatch(Action::Copy, &selection, &PathBuf::from("/tmp"))?;
//! engine.dispatch(Action::Paste, &[], &PathBuf::from("/tmp/backup"))?;
//! engine.run_until_idle().await;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod ui;

pub use app::{
    Action, Clipboard, ClipboardMode, ConfirmationRequest, Dispatch, Engine, ProcessRegistry,
};
pub use ui::{ConfirmModal, ProcessBar, ProgressGauge};
