use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::command::Ticks;

pub const SECONDS_PER_MINUTE: Ticks = 60;
pub const SECONDS_PER_HOUR: Ticks = 3600;
pub const SECONDS_PER_DAY: Ticks = 24 * SECONDS_PER_HOUR;
pub const DEFAULT_START_SECONDS: Ticks = 6 * SECONDS_PER_HOUR;

static CLOCK_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_clock_lock_poison_once(operation: &'static str) {
    if CLOCK_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "game clock lock poisoned; recovered inner value");
    }
}

/// Elapsed game time in seconds. Clones observe the same counter.
///
/// Only the scheduler advances the clock, once per executed command.
#[derive(Clone, Debug)]
pub struct GameClock {
    seconds: Arc<RwLock<Ticks>>,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::starting_at(DEFAULT_START_SECONDS)
    }
}

impl GameClock {
    pub fn starting_at(seconds: Ticks) -> Self {
        Self {
            seconds: Arc::new(RwLock::new(seconds)),
        }
    }

    pub fn time(&self) -> Ticks {
        match self.seconds.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_clock_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub fn increment(&self, amount: Ticks) {
        match self.seconds.write() {
            Ok(mut guard) => *guard += amount,
            Err(poisoned) => {
                warn_clock_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard += amount;
            }
        }
    }

    /// 24-hour `HH:MM` of the current day.
    pub fn time_of_day(&self) -> String {
        format_time_of_day(self.time())
    }
}

pub fn format_time_of_day(seconds: Ticks) -> String {
    let in_day = seconds.rem_euclid(SECONDS_PER_DAY);
    let hours = in_day / SECONDS_PER_HOUR;
    let minutes = (in_day % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    format!("{hours:02}:{minutes:02}")
}
