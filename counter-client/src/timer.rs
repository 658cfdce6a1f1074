// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A cancellable delay.

use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
#[path = "unit_tests/timer.rs"]
mod tests;

/// How a [`SettleTimer`] finished.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerOutcome {
    /// The delay elapsed.
    Elapsed,
    /// The timer was cancelled before the delay elapsed.
    Cancelled,
}

/// A delay that can be cancelled while it is running.
///
/// Dropping the timer cancels it.
#[derive(Debug)]
pub struct SettleTimer {
    token: CancellationToken,
}

impl SettleTimer {
    /// Starts a timer of `delay`, returning it together with the future that finishes when
    /// the delay elapses or the timer is cancelled.
    pub fn start(delay: Duration) -> (Self, impl Future<Output = TimerOutcome> + Send + 'static) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let future = async move {
            tokio::select! {
                () = sleep(delay) => TimerOutcome::Elapsed,
                () = cancelled.cancelled() => TimerOutcome::Cancelled,
            }
        };
        (SettleTimer { token }, future)
    }

    /// Cancels the timer.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` if the timer was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SettleTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
