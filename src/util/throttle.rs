//! Sliding-window request throttle with a reduced-rate backpressure mode.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_millis(1000);

/// How long [`RequestThrottler::enter_throttle_mode`] derates by default.
pub const DEFAULT_THROTTLE_DURATION: Duration = Duration::from_secs(15 * 60);

/// Read-only view of a throttler, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleState {
    pub requests_in_window: usize,
    pub max_requests_per_second: u32,
    pub original_rate: u32,
    /// Time left in throttle mode, if any.
    #[serde(rename = "throttledForMs", serialize_with = "as_millis")]
    pub throttled_for: Option<Duration>,
}

fn as_millis<S: serde::Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => s.serialize_some(&(d.as_millis() as u64)),
        None => s.serialize_none(),
    }
}

#[derive(Debug)]
struct Window {
    timestamps: VecDeque<Instant>,
    max_requests_per_second: u32,
    original_rate: u32,
    throttled_until: Option<Instant>,
}

impl Window {
    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.timestamps.front() {
            if now.duration_since(*oldest) >= WINDOW {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Either admit a request at `now` or say how long to wait first.
    fn admit(&mut self, now: Instant) -> Result<(), Duration> {
        if let Some(until) = self.throttled_until {
            if now < until {
                return Err(until - now);
            }
            self.throttled_until = None;
        }

        self.prune(now);
        if self.timestamps.len() >= self.max_requests_per_second as usize {
            if let Some(oldest) = self.timestamps.front() {
                return Err(WINDOW.saturating_sub(now.duration_since(*oldest)));
            }
        }

        self.timestamps.push_back(now);
        Ok(())
    }
}

/// Limits how many requests start per second.
///
/// Shared by reference across concurrent calls. The window lock is only held
/// for the prune/check/record step, never while sleeping. Waiting callers are
/// admitted in no particular order.
#[derive(Debug)]
pub struct RequestThrottler {
    window: Mutex<Window>,
}

impl RequestThrottler {
    /// A throttler admitting `max_requests_per_second` (at least 1).
    pub fn new(max_requests_per_second: u32) -> Self {
        let rate = max_requests_per_second.max(1);
        Self {
            window: Mutex::new(Window {
                timestamps: VecDeque::with_capacity(rate as usize),
                max_requests_per_second: rate,
                original_rate: rate,
                throttled_until: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait until a request may start, then record it.
    ///
    /// Never fails. Drop the future to stop waiting.
    pub async fn throttle(&self) {
        loop {
            let wait = match self.lock().admit(Instant::now()) {
                Ok(()) => return,
                Err(wait) => wait,
            };
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Throttling request");
            tokio::time::sleep(wait).await;
        }
    }

    /// Derate to 30% of the original rate (minimum 1) for `duration`.
    ///
    /// `None` uses [`DEFAULT_THROTTLE_DURATION`]. Calls made while throttled
    /// wait for the remainder of the period before being admitted.
    pub fn enter_throttle_mode(&self, duration: Option<Duration>) {
        let duration = duration.unwrap_or(DEFAULT_THROTTLE_DURATION);
        let mut window = self.lock();
        let reduced = ((window.original_rate as u64 * 3) / 10).max(1) as u32;
        window.max_requests_per_second = reduced;
        window.throttled_until = Some(Instant::now() + duration);
        tracing::warn!(
            rate = reduced,
            original_rate = window.original_rate,
            duration_ms = duration.as_millis() as u64,
            "Entering throttle mode"
        );
    }

    /// Step the rate up by one, stopping at the original rate.
    pub fn gradually_increase_rate(&self) {
        let mut window = self.lock();
        if window.max_requests_per_second < window.original_rate {
            window.max_requests_per_second += 1;
            tracing::debug!(
                rate = window.max_requests_per_second,
                original_rate = window.original_rate,
                "Increasing request rate"
            );
        }
    }

    /// Clear the window and leave throttle mode at the original rate.
    pub fn reset(&self) {
        let mut window = self.lock();
        window.timestamps.clear();
        window.max_requests_per_second = window.original_rate;
        window.throttled_until = None;
    }

    /// Requests per second currently admitted.
    pub fn current_rate(&self) -> u32 {
        self.lock().max_requests_per_second
    }

    pub fn original_rate(&self) -> u32 {
        self.lock().original_rate
    }

    /// Whether a throttle period is still running.
    pub fn is_throttled(&self) -> bool {
        self.lock()
            .throttled_until
            .is_some_and(|until| Instant::now() < until)
    }

    pub fn snapshot(&self) -> ThrottleState {
        let mut window = self.lock();
        let now = Instant::now();
        window.prune(now);
        ThrottleState {
            requests_in_window: window.timestamps.len(),
            max_requests_per_second: window.max_requests_per_second,
            original_rate: window.original_rate,
            throttled_for: window
                .throttled_until
                .filter(|until| now < *until)
                .map(|until| until - now),
        }
    }
}

impl Default for RequestThrottler {
    fn default() -> Self {
        Self::new(10)
    }
}
