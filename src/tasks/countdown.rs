//! Countdown tick task

use std::{sync::Weak, time::Duration};
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::state::TimerController;

/// Tick loop for one countdown.
///
/// Runs until the controller reports the countdown finished or superseded, or
/// until the controller itself is dropped. Missed ticks are caught up in a
/// burst on the next wake-up.
pub async fn countdown_task(controller: Weak<TimerController>, generation: u64, period: Duration) {
    debug!("Tick task #{} started", generation);

    let mut interval = interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;

        let Some(controller) = controller.upgrade() else {
            debug!("Controller dropped, stopping tick task #{}", generation);
            return;
        };

        if !controller.apply_tick(generation) {
            debug!("Tick task #{} finished", generation);
            return;
        }
    }
}
