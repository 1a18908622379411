//! Observer task that logs countdown transitions

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{ClockDisplay, TimerController, TimerState, Transition};

fn clock_of(seconds: u64) -> ClockDisplay {
    TimerState {
        remaining_seconds: seconds,
        ..TimerState::new()
    }
    .clock()
}

/// Log line for a transition
pub fn describe(transition: &Transition) -> String {
    match *transition {
        Transition::Started { total_seconds } => format!(
            "Countdown started: {} ({} seconds)",
            clock_of(total_seconds),
            total_seconds
        ),
        Transition::Restarted { total_seconds } => format!(
            "Countdown restarted: {} ({} seconds)",
            clock_of(total_seconds),
            total_seconds
        ),
        Transition::Completed => "Countdown finished".to_string(),
        Transition::Reset { remaining_seconds, total_seconds } => format!(
            "Countdown reset with {} of {} seconds left",
            clock_of(remaining_seconds),
            total_seconds
        ),
        Transition::FieldsCleared => "Timer fields cleared".to_string(),
    }
}

/// Background task that follows the controller's transitions and logs them.
///
/// Returns the number of transitions logged once the controller is dropped.
pub async fn state_logger_task(controller: Arc<TimerController>) -> usize {
    info!("Starting countdown state logger");

    let mut transitions = controller.transitions();
    drop(controller);

    let mut logged = 0;
    loop {
        match transitions.recv().await {
            Ok(transition) => {
                info!("{}", describe(&transition));
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("State logger fell behind, skipped {} transitions", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    debug!("Timer controller gone, state logger exiting");
    logged
}
