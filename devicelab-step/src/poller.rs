//! Generic polling engine
//!
//! One fixed-interval loop used for both the job-status wait and the
//! scriptless wait; the two call sites differ only in their fetch function,
//! terminal predicate, and timeout budget.

use std::future::Future;
use std::time::Duration;

use devicelab_client::error::Result;
use tokio::time::{self, Instant};

/// Interval between status checks
pub const POLL_TICK: Duration = Duration::from_secs(30);

/// Result of a polling loop
#[derive(Debug)]
pub struct PollOutcome<S> {
    /// The last snapshot observed; the terminal one unless `timed_out`
    pub state: S,
    /// The budget ran out before a terminal snapshot arrived
    pub timed_out: bool,
}

/// Poll `fetch` every `tick` until `is_terminal` or the `budget` elapses
///
/// The first check happens only after one full tick, never at t=0 — the
/// endpoint should not be hammered right after submission. On each tick a
/// fresh snapshot is fetched; the elapsed-time check only runs for
/// non-terminal snapshots, so at least one fetch always happens even with a
/// zero budget. Fetch failures propagate; the status endpoints are expected
/// to be reliable, and a retry would happen no sooner than the next tick
/// anyway.
pub async fn poll_until<S, F, Fut, P>(
    tick: Duration,
    budget: Duration,
    mut fetch: F,
    is_terminal: P,
) -> Result<PollOutcome<S>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S>>,
    P: Fn(&S) -> bool,
{
    let started = Instant::now();
    let mut ticker = time::interval_at(started + tick, tick);
    // A fetch slower than one tick must not trigger a burst of catch-up
    // checks; missed ticks are dropped and polling stays on schedule.
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let state = fetch().await?;

        if is_terminal(&state) {
            return Ok(PollOutcome {
                state,
                timed_out: false,
            });
        }

        if started.elapsed() >= budget {
            return Ok(PollOutcome {
                state,
                timed_out: true,
            });
        }
    }
}
