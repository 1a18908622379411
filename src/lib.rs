//! Countdown Timer - A state-managed countdown timer
//!
//! This library provides the timer controller (field editing, start, reset,
//! the once-per-second tick task and derived display values) plus a small
//! HTTP surface that a presentation layer can drive.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, TimerController, TimerState};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
