//! Background tasks module
//!
//! This module contains the countdown tick loop and the state observer that
//! run alongside the HTTP server.

pub mod countdown;
pub mod state_logger;

// Re-export main functions
pub use countdown::countdown_task;
pub use state_logger::state_logger_task;
