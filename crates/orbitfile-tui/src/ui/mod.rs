//! UI components and widgets.

mod gauge;
mod modals;
mod process_bar;

pub use gauge::ProgressGauge;
pub use modals::ConfirmModal;
pub use process_bar::ProcessBar;
