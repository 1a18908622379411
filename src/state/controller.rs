//! Timer controller: owns the countdown state and its tick task

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use super::timer_state::{Field, Tick, TimerState};
use crate::tasks::countdown_task;

/// Nominal time between two ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Countdown lifecycle events, published alongside state snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started { total_seconds: u64 },
    Restarted { total_seconds: u64 },
    /// Ran down to zero and reset itself
    Completed,
    /// Manual reset of a running countdown
    Reset { remaining_seconds: u64, total_seconds: u64 },
    /// Manual reset while idle, only the fields changed
    FieldsCleared,
}

/// The currently installed tick task
#[derive(Debug)]
struct Ticker {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct Inner {
    state: TimerState,
    ticker: Option<Ticker>,
    generation: u64,
}

impl Inner {
    /// Abort the tick task, if any. Ticks from it are rejected from here on.
    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!("Cancelling tick task #{}", ticker.generation);
            ticker.handle.abort();
        }
    }
}

/// Single countdown timer shared between the presentation layer and its tick task
#[derive(Debug)]
pub struct TimerController {
    inner: Mutex<Inner>,
    /// Latest state, republished after every change
    update_tx: watch::Sender<TimerState>,
    transition_tx: broadcast::Sender<Transition>,
}

impl TimerController {
    /// Create an idle controller
    pub fn new() -> Arc<Self> {
        let (update_tx, _) = watch::channel(TimerState::new());
        let (transition_tx, _) = broadcast::channel(100);
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
            update_tx,
            transition_tx,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e: PoisonError<_>| {
            warn!("Timer state lock was poisoned, recovering");
            e.into_inner()
        })
    }

    fn publish(&self, state: &TimerState) {
        self.update_tx.send_replace(state.clone());
    }

    fn announce(&self, transition: Transition) {
        // No subscribers is fine
        let _ = self.transition_tx.send(transition);
    }

    /// Current state snapshot
    pub fn snapshot(&self) -> TimerState {
        self.lock().state.clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.update_tx.subscribe()
    }

    /// Subscribe to lifecycle transitions
    pub fn transitions(&self) -> broadcast::Receiver<Transition> {
        self.transition_tx.subscribe()
    }

    /// Overwrite an edit field
    pub fn set_field(&self, field: Field, value: u64) {
        self.preset(&[(field, value)]);
    }

    /// Overwrite several edit fields under one lock, publishing once
    pub fn preset(&self, values: &[(Field, u64)]) {
        let mut inner = self.lock();
        for &(field, value) in values {
            inner.state.set_field(field, value);
        }
        debug!(
            "Preset fields to {}h {}m {}s",
            inner.state.hours, inner.state.minutes, inner.state.seconds
        );
        self.publish(&inner.state);
    }

    /// Increment an edit field by one
    pub fn increment(&self, field: Field) {
        let mut inner = self.lock();
        inner.state.increment(field);
        debug!("Incremented {} to {}", field, inner.state.field(field));
        self.publish(&inner.state);
    }

    /// Decrement an edit field by one, never below zero
    pub fn decrement(&self, field: Field) {
        let mut inner = self.lock();
        inner.state.decrement(field);
        debug!("Decremented {} to {}", field, inner.state.field(field));
        self.publish(&inner.state);
    }

    pub fn inc_hour(&self) {
        self.increment(Field::Hours);
    }

    pub fn dec_hour(&self) {
        self.decrement(Field::Hours);
    }

    pub fn inc_minute(&self) {
        self.increment(Field::Minutes);
    }

    pub fn dec_minute(&self) {
        self.decrement(Field::Minutes);
    }

    pub fn inc_second(&self) {
        self.increment(Field::Seconds);
    }

    pub fn dec_second(&self) {
        self.decrement(Field::Seconds);
    }

    /// Start counting down from the current fields.
    ///
    /// A countdown already in progress is cancelled and replaced. A zero
    /// duration completes on the spot. Must be called within a Tokio runtime.
    pub fn start_countdown(self: &Arc<Self>) {
        let mut inner = self.lock();
        let restarting = inner.state.is_running;
        inner.cancel_ticker();

        let total = inner.state.begin();
        if restarting {
            info!("Restarting countdown with {} seconds", total);
            self.announce(Transition::Restarted { total_seconds: total });
        } else {
            info!("Starting countdown with {} seconds", total);
            self.announce(Transition::Started { total_seconds: total });
        }

        if total == 0 {
            inner.state.reset();
            info!("Countdown of zero seconds completed immediately");
            self.publish(&inner.state);
            self.announce(Transition::Completed);
            return;
        }

        inner.generation += 1;
        let generation = inner.generation;
        let handle = tokio::spawn(countdown_task(Arc::downgrade(self), generation, TICK_PERIOD));
        inner.ticker = Some(Ticker { generation, handle });
        self.publish(&inner.state);
    }

    /// Stop any countdown and clear the edit fields
    pub fn reset(&self) {
        let mut inner = self.lock();
        let transition = if inner.state.is_running {
            info!(
                "Resetting countdown with {} of {} seconds left",
                inner.state.remaining_seconds, inner.state.total_seconds
            );
            Transition::Reset {
                remaining_seconds: inner.state.remaining_seconds,
                total_seconds: inner.state.total_seconds,
            }
        } else {
            Transition::FieldsCleared
        };
        inner.cancel_ticker();
        inner.state.reset();
        self.publish(&inner.state);
        self.announce(transition);
    }

    /// Apply one tick on behalf of tick task `generation`.
    ///
    /// Returns false once that task should stop, either because the countdown
    /// finished or because the task has been superseded.
    pub(crate) fn apply_tick(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        match &inner.ticker {
            Some(ticker) if ticker.generation == generation => {}
            _ => {
                debug!("Discarding stale tick from task #{}", generation);
                return false;
            }
        }

        match inner.state.tick() {
            Tick::Counting(remaining) => {
                debug!("Tick: {} seconds remaining", remaining);
                self.publish(&inner.state);
                true
            }
            Tick::Completed => {
                // The task is finishing on its own; detach rather than abort.
                inner.ticker = None;
                info!("Countdown completed");
                self.publish(&inner.state);
                self.announce(Transition::Completed);
                false
            }
            Tick::Idle => {
                inner.ticker = None;
                false
            }
        }
    }

    /// Whether a tick task is currently installed
    pub fn has_ticker(&self) -> bool {
        self.lock().ticker.is_some()
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.cancel_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn set_fields(controller: &TimerController, hours: u64, minutes: u64, seconds: u64) {
        for _ in 0..hours {
            controller.inc_hour();
        }
        for _ in 0..minutes {
            controller.inc_minute();
        }
        for _ in 0..seconds {
            controller.inc_second();
        }
    }

    #[test]
    fn field_operations_clamp_and_publish() {
        let controller = TimerController::new();
        let rx = controller.subscribe();

        controller.dec_hour();
        controller.dec_minute();
        controller.dec_second();
        set_fields(&controller, 2, 0, 1);
        controller.dec_hour();

        let state = controller.snapshot();
        assert_eq!((state.hours, state.minutes, state.seconds), (1, 0, 1));
        assert_eq!(*rx.borrow(), state);
    }

    #[test]
    fn huge_preset_is_applied_at_once() {
        let controller = TimerController::new();
        let rx = controller.subscribe();

        controller.preset(&[(Field::Hours, 2_000_000_000), (Field::Seconds, u64::MAX)]);
        controller.set_field(Field::Minutes, 7);

        let state = controller.snapshot();
        assert_eq!((state.hours, state.minutes, state.seconds), (2_000_000_000, 7, u64::MAX));
        assert_eq!(state.configured_seconds(), u64::MAX);
        assert_eq!(*rx.borrow(), state);
    }

    fn drain(rx: &mut broadcast::Receiver<Transition>) -> Vec<Transition> {
        let mut seen = Vec::new();
        while let Ok(transition) = rx.try_recv() {
            seen.push(transition);
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn restart_before_first_tick_is_announced() {
        let controller = TimerController::new();
        let mut rx = controller.transitions();
        set_fields(&controller, 0, 0, 10);
        controller.start_countdown();
        controller.start_countdown();
        controller.set_field(Field::Seconds, 5);
        controller.start_countdown();

        assert_eq!(
            drain(&mut rx),
            vec![
                Transition::Started { total_seconds: 10 },
                Transition::Restarted { total_seconds: 10 },
                Transition::Restarted { total_seconds: 5 },
            ]
        );
        controller.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn manual_reset_with_one_second_left_is_not_completion() {
        let controller = TimerController::new();
        let mut rx = controller.transitions();
        set_fields(&controller, 0, 10, 0);
        controller.start_countdown();
        for _ in 0..599 {
            assert!(controller.apply_tick(1));
        }
        assert_eq!(controller.snapshot().remaining_seconds, 1);

        controller.reset();
        controller.reset();
        assert_eq!(
            drain(&mut rx),
            vec![
                Transition::Started { total_seconds: 600 },
                Transition::Reset { remaining_seconds: 1, total_seconds: 600 },
                Transition::FieldsCleared,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn natural_and_zero_completion_are_announced() {
        let controller = TimerController::new();
        let mut rx = controller.transitions();
        controller.start_countdown();
        set_fields(&controller, 0, 0, 2);
        controller.start_countdown();
        sleep(Duration::from_millis(2500)).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                Transition::Started { total_seconds: 0 },
                Transition::Completed,
                Transition::Started { total_seconds: 2 },
                Transition::Completed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn start_snapshots_fields() {
        let controller = TimerController::new();
        set_fields(&controller, 1, 2, 3);
        controller.start_countdown();

        let state = controller.snapshot();
        assert!(state.is_running);
        assert_eq!(state.total_seconds, 3723);
        assert_eq!(state.remaining_seconds, 3723);
        assert!(controller.has_ticker());
        controller.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_completes_immediately() {
        let controller = TimerController::new();
        controller.start_countdown();

        let state = controller.snapshot();
        assert!(!state.is_running);
        assert_eq!(state.total_seconds, 0);
        assert_eq!(state.remaining_seconds, 0);
        assert!(!controller.has_ticker());
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_second_then_resets() {
        let controller = TimerController::new();
        set_fields(&controller, 0, 0, 10);
        controller.start_countdown();

        // Land between tick deadlines to keep ordering unambiguous
        sleep(Duration::from_millis(500)).await;
        for k in 1..10u64 {
            sleep(TICK_PERIOD).await;
            let state = controller.snapshot();
            assert!(state.is_running);
            assert_eq!(state.remaining_seconds, 10 - k);
            assert_eq!(state.seconds, 10);
        }

        sleep(TICK_PERIOD).await;
        assert_eq!(controller.snapshot(), TimerState::new());
        assert!(!controller.has_ticker());

        sleep(TICK_PERIOD * 3).await;
        assert_eq!(controller.snapshot(), TimerState::new());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_running_countdown() {
        let controller = TimerController::new();
        set_fields(&controller, 0, 0, 10);
        controller.start_countdown();

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(controller.snapshot().remaining_seconds, 9);

        // Fields are untouched by start, so the restart uses 10 again
        controller.start_countdown();
        assert_eq!(controller.snapshot().remaining_seconds, 10);

        // The old task would have ticked at 2.0s, the new one ticks at 2.5s
        sleep(Duration::from_millis(1200)).await;
        assert_eq!(controller.snapshot().remaining_seconds, 9);

        sleep(TICK_PERIOD).await;
        assert_eq!(controller.snapshot().remaining_seconds, 8);
        controller.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_ticks() {
        let controller = TimerController::new();
        set_fields(&controller, 0, 1, 0);
        controller.start_countdown();

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(controller.snapshot().remaining_seconds, 58);

        controller.reset();
        assert!(!controller.has_ticker());

        sleep(TICK_PERIOD * 5).await;
        assert_eq!(controller.snapshot(), TimerState::new());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_while_idle_clears_fields() {
        let controller = TimerController::new();
        set_fields(&controller, 1, 1, 1);
        controller.reset();
        controller.reset();

        let state = controller.snapshot();
        assert!(!state.is_running);
        assert_eq!(state.total_seconds, 0);
        assert_eq!((state.hours, state.minutes, state.seconds), (0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_is_rejected() {
        let controller = TimerController::new();
        set_fields(&controller, 0, 0, 30);
        controller.start_countdown();
        controller.start_countdown();

        assert!(!controller.apply_tick(1));
        assert_eq!(controller.snapshot().remaining_seconds, 30);
        assert!(controller.apply_tick(2));
        assert_eq!(controller.snapshot().remaining_seconds, 29);
        controller.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_ticks() {
        let controller = TimerController::new();
        let mut rx = controller.subscribe();
        set_fields(&controller, 0, 0, 2);
        controller.start_countdown();
        rx.borrow_and_update();

        rx.changed().await.expect("controller alive");
        assert_eq!(rx.borrow_and_update().remaining_seconds, 1);

        rx.changed().await.expect("controller alive");
        assert!(!rx.borrow_and_update().is_running);
    }
}
