//! Timer state structure and the pure logic around it

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;

/// One of the three user-editable duration components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Hours,
    Minutes,
    Seconds,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Hours => "hours",
            Field::Minutes => "minutes",
            Field::Seconds => "seconds",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hours" | "hour" => Ok(Field::Hours),
            "minutes" | "minute" => Ok(Field::Minutes),
            "seconds" | "second" => Ok(Field::Seconds),
            other => Err(format!("Unknown timer field: {}", other)),
        }
    }
}

/// Result of advancing the countdown by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not running, nothing changed
    Idle,
    /// Decremented, this many seconds are left
    Counting(u64),
    /// Reached zero and the state was reset
    Completed,
}

/// Remaining time split into clock components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDisplay {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl fmt::Display for ClockDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hours, self.minutes, self.seconds)
    }
}

/// Countdown state: the edited fields plus the active countdown, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub is_running: bool,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimerState {
    /// Create a new idle timer state with all fields at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of an edit field
    pub fn field(&self, field: Field) -> u64 {
        match field {
            Field::Hours => self.hours,
            Field::Minutes => self.minutes,
            Field::Seconds => self.seconds,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut u64 {
        match field {
            Field::Hours => &mut self.hours,
            Field::Minutes => &mut self.minutes,
            Field::Seconds => &mut self.seconds,
        }
    }

    pub fn set_field(&mut self, field: Field, value: u64) {
        *self.field_mut(field) = value;
    }

    /// Increment a field by one; saturates instead of wrapping
    pub fn increment(&mut self, field: Field) {
        let value = self.field_mut(field);
        *value = value.saturating_add(1);
    }

    /// Decrement a field by one, floored at zero
    pub fn decrement(&mut self, field: Field) {
        let value = self.field_mut(field);
        *value = value.saturating_sub(1);
    }

    /// Duration the fields currently describe, in seconds
    pub fn configured_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(SECONDS_PER_HOUR)
            .saturating_add(self.minutes.saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(self.seconds)
    }

    /// Snapshot the fields into a fresh countdown and mark it running
    pub fn begin(&mut self) -> u64 {
        self.total_seconds = self.configured_seconds();
        self.remaining_seconds = self.total_seconds;
        self.is_running = true;
        self.total_seconds
    }

    /// Advance one tick. Reaching zero resets the whole state.
    pub fn tick(&mut self) -> Tick {
        if !self.is_running {
            return Tick::Idle;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.reset();
            Tick::Completed
        } else {
            Tick::Counting(self.remaining_seconds)
        }
    }

    /// Stop any countdown and clear the edit fields
    pub fn reset(&mut self) {
        if self.is_running {
            self.is_running = false;
            self.total_seconds = 0;
            self.remaining_seconds = 0;
        }
        self.hours = 0;
        self.minutes = 0;
        self.seconds = 0;
    }

    /// Remaining time as a fraction of the total, 0 when no duration is set
    pub fn progress_fraction(&self) -> f64 {
        if self.total_seconds == 0 {
            0.0
        } else {
            self.remaining_seconds as f64 / self.total_seconds as f64
        }
    }

    pub fn display_hours(&self) -> u64 {
        self.remaining_seconds / SECONDS_PER_HOUR
    }

    pub fn display_minutes(&self) -> u64 {
        (self.remaining_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE
    }

    pub fn display_seconds(&self) -> u64 {
        self.remaining_seconds % SECONDS_PER_MINUTE
    }

    pub fn clock(&self) -> ClockDisplay {
        ClockDisplay {
            hours: self.display_hours(),
            minutes: self.display_minutes(),
            seconds: self.display_seconds(),
        }
    }
}
