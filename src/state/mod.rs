//! State management module
//!
//! This module contains the countdown state, the controller that owns it and
//! the shared application state handed to the HTTP layer.

pub mod timer_state;
pub mod controller;
pub mod app_state;

// Re-export main types
pub use timer_state::{ClockDisplay, Field, Tick, TimerState};
pub use controller::{TimerController, Transition, TICK_PERIOD};
pub use app_state::AppState;
