//! Quiet-period stability detection
//!
//! The host gives no completion signal for asynchronously rendered content
//! (diagrams, embeds, late layout passes). Instead the surface's mutation feed
//! is watched until it has been quiet for a while, with an absolute timeout so
//! the wait always ends.

use crate::host::PreviewSurface;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Timing knobs for the stability wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityPolicy {
    /// Delay after layout-ready before observation starts
    pub initial_delay: Duration,
    /// How often the quiet period is checked
    pub poll_interval: Duration,
    /// Time without mutations after which content counts as stable
    pub quiet_period: Duration,
    /// Upper bound on observation, measured from its start
    pub safety_timeout: Duration,
}

impl Default for StabilityPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
            quiet_period: Duration::from_millis(1000),
            safety_timeout: Duration::from_millis(5000),
        }
    }
}

/// Why the wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityOutcome {
    /// No mutation for longer than the quiet period
    Quiet,
    /// The safety timeout elapsed first
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityReport {
    pub outcome: StabilityOutcome,
    /// Mutation notifications observed
    pub mutations: u64,
    /// Observation time, excluding the initial delay
    pub observed_for: Duration,
}

/// Wait until the surface stops mutating or the safety timeout elapses
pub async fn wait_for_stability(
    surface: &dyn PreviewSurface,
    policy: &StabilityPolicy,
) -> StabilityReport {
    surface.layout_ready().await;
    time::sleep(policy.initial_delay).await;

    let mut feed = surface.mutations();
    feed.borrow_and_update();
    let mut feed_open = true;

    let started = Instant::now();
    let deadline = time::sleep_until(started + policy.safety_timeout);
    tokio::pin!(deadline);

    let mut ticker = time::interval(policy.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_mutation = started;
    let mut mutations = 0u64;

    let outcome = loop {
        tokio::select! {
            biased;

            _ = &mut deadline => break StabilityOutcome::TimedOut,
            changed = feed.changed(), if feed_open => match changed {
                Ok(()) => {
                    feed.borrow_and_update();
                    mutations += 1;
                    last_mutation = Instant::now();
                }
                // Host dropped the feed; nothing more can change.
                Err(_) => feed_open = false,
            },
            _ = ticker.tick() => {
                if last_mutation.elapsed() > policy.quiet_period {
                    break StabilityOutcome::Quiet;
                }
            }
        }
    };

    let report = StabilityReport {
        outcome,
        mutations,
        observed_for: started.elapsed(),
    };
    log::debug!(
        "Stability wait ended {:?} after {:?} ({} mutations)",
        report.outcome,
        report.observed_for,
        report.mutations
    );
    report
}
