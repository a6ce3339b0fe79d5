// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Exponential backoff for connection establishment.

use crate::config::{ConnectionConfig, DEFAULT_MAX_BACKOFF_ATTEMPTS};
use std::fmt;
use std::time::Duration;

/// Waits between connection attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<F: Fn(Duration)> Sleeper for F {
    fn sleep(&self, duration: Duration) {
        self(duration)
    }
}

/// Retry budget and delay schedule for transient connect failures.
pub struct Backoff {
    /// Retries allowed after the first attempt.
    pub max_attempts: u32,
    /// Base time unit; retry `n` waits `unit * 2^n`.
    pub unit: Duration,
    sleeper: Box<dyn Sleeper>,
}

impl Backoff {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            unit: Duration::from_secs(1),
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Uses the attempt budget from `config`.
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(config.max_backoff_attempts())
    }

    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Replaces the real sleep, e.g. to simulate backoff in tests.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Delay before attempt number `attempt` (the first attempt is 0).
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.unit.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub(crate) fn wait(&self, attempt: u32) {
        let delay = self.delay(attempt);
        if !delay.is_zero() {
            self.sleeper.sleep(delay);
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BACKOFF_ATTEMPTS)
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backoff")
            .field("max_attempts", &self.max_attempts)
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}
