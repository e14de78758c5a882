// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::error::{ensure_non_negative, Result};

/// A leaky bucket rate limiter.
///
/// Credits accrue continuously at `credits_per_second`, up to `max_balance`. Each successful
/// [`RateLimiter::check_credit`] withdraws the cost of the item from the balance.
pub struct RateLimiter {
    credits_per_second: f64,
    max_balance: f64,

    /// Balance and time of the last check, updated together
    inner: Mutex<RateLimiterState>,
}

struct RateLimiterState {
    /// Credits currently available, always in `[0, max_balance]`
    balance: f64,

    /// Last time the balance was replenished
    last_tick: Instant,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("credits_per_second", &self.credits_per_second)
            .field("max_balance", &self.max_balance)
            .field("balance", &self.lock().balance)
            .finish()
    }
}

impl RateLimiter {
    /// Creates a new RateLimiter.
    ///
    /// The limiter starts with a full balance, so the first checks succeed right away.
    ///
    /// # Parameters
    /// * `credits_per_second` - Rate at which credits accrue. A rate of 0 never replenishes the
    ///   balance.
    /// * `max_balance` - Maximum number of credits that can be accumulated. It should be at least
    ///   `max(credits_per_second, 1.0)` for the limiter to let single items through.
    ///
    /// # Errors
    /// Both parameters must be finite and non negative.
    pub fn new(credits_per_second: f64, max_balance: f64) -> Result<Self> {
        let credits_per_second = ensure_non_negative("credits_per_second", credits_per_second)?;
        let max_balance = ensure_non_negative("max_balance", max_balance)?;

        Ok(RateLimiter {
            credits_per_second,
            max_balance,
            inner: Mutex::new(RateLimiterState {
                balance: max_balance,
                last_tick: Instant::now(),
            }),
        })
    }

    pub fn credits_per_second(&self) -> f64 {
        self.credits_per_second
    }

    pub fn max_balance(&self) -> f64 {
        self.max_balance
    }

    /// Credits currently available, without replenishing
    pub fn balance(&self) -> f64 {
        self.lock().balance
    }

    /// Checks if `item_cost` credits are available and withdraws them if they are.
    ///
    /// # Returns
    /// `true` if the item is allowed, `false` otherwise
    pub fn check_credit(&self, item_cost: f64) -> bool {
        let mut state = self.lock();
        let now = Instant::now();
        self.check_credit_locked(&mut state, item_cost, now)
    }

    /// Same as [`RateLimiter::check_credit`], with the balance replenished up to `now`.
    ///
    /// An instant older than the last check accrues nothing.
    pub fn check_credit_at(&self, item_cost: f64, now: Instant) -> bool {
        let mut state = self.lock();
        self.check_credit_locked(&mut state, item_cost, now)
    }

    fn check_credit_locked(
        &self,
        state: &mut RateLimiterState,
        item_cost: f64,
        now: Instant,
    ) -> bool {
        self.replenish(state, now);

        if state.balance >= item_cost {
            state.balance -= item_cost;
            true
        } else {
            false
        }
    }

    /// Replenish credits based on elapsed time
    fn replenish(&self, state: &mut RateLimiterState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_tick);
        if now > state.last_tick {
            state.last_tick = now;
        }

        let accrued = elapsed.as_secs_f64() * self.credits_per_second;
        state.balance = (state.balance + accrued).min(self.max_balance);
    }

    fn lock(&self) -> MutexGuard<'_, RateLimiterState> {
        // The state is only written by plain arithmetic, it is consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
