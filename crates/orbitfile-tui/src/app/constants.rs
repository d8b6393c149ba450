//! Application constants.

/// Display lines taken by one entry in the process list.
pub const LINES_PER_PROCESS: usize = 3;

/// Smallest process-list height that still shows one entry.
pub const MIN_PROCESS_VIEW_HEIGHT: usize = 2;

/// Event loop tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 50;
