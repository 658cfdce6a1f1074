// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use futures::FutureExt as _;
use tokio::time::{advance, Instant};

use super::{SettleTimer, TimerOutcome};

/// Test that the timer fires only once the delay has elapsed.
#[tokio::test(start_paused = true)]
async fn elapses_after_the_delay() {
    let start = Instant::now();
    let (_timer, future) = SettleTimer::start(Duration::from_secs(5));

    assert_eq!(future.await, TimerOutcome::Elapsed);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn cancelling_finishes_early() {
    let (timer, future) = SettleTimer::start(Duration::from_secs(5));
    let mut future = Box::pin(future);

    advance(Duration::from_secs(1)).await;
    assert!((&mut future).now_or_never().is_none());

    timer.cancel();
    assert!(timer.is_cancelled());
    assert_eq!(future.await, TimerOutcome::Cancelled);
}

/// Test that dropping a timer cancels it.
#[tokio::test(start_paused = true)]
async fn dropping_cancels() {
    let (timer, future) = SettleTimer::start(Duration::from_secs(5));

    drop(timer);

    assert_eq!(future.await, TimerOutcome::Cancelled);
}
