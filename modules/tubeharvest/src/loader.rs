//! Convergence-gated scroll loading for the channel listing.

use anyhow::Result;
use tracing::{debug, info, warn};

use tubeharvest_common::VideoCandidate;

use crate::aggregate::Aggregator;
use crate::convergence::{ConvergencePolicy, ConvergenceState};
use crate::surface::ListingSurface;

/// What a loading session produced. An exhausted session (attempt budget hit
/// before the streak completed) is reported, not errored; the caller decides
/// whether the partial set is acceptable.
#[derive(Debug)]
pub struct LoadOutcome<T> {
    pub records: Vec<T>,
    pub converged: bool,
    pub attempts: u32,
}

/// Scroll the listing until its visible set stabilizes, merging every
/// snapshot through the aggregator as it is observed.
pub async fn load_listing<S>(
    surface: &S,
    policy: &ConvergencePolicy,
) -> Result<LoadOutcome<VideoCandidate>>
where
    S: ListingSurface + ?Sized,
{
    let mut aggregator = Aggregator::new();
    let mut state = ConvergenceState::new();

    while state.should_continue(policy) {
        surface.advance().await?;

        // Convergence tracks the raw card count, not the extracted set:
        // cards can materialize before their link or thumbnail resolves,
        // and those still count as growth.
        let count = surface.visible_count().await?;
        aggregator.merge(surface.snapshot().await?);

        let next = state.observe(count);
        if next.last_count > state.last_count {
            debug!(visible = next.last_count, "Listing grew");
        }
        state = next;
    }

    let converged = state.converged(policy);
    if !converged {
        warn!(
            attempts = state.attempts,
            visible = state.last_count,
            "Listing load hit its attempt budget before stabilizing"
        );
    }
    info!(
        unique = aggregator.len(),
        attempts = state.attempts,
        converged,
        "Listing load finished"
    );

    Ok(LoadOutcome {
        records: aggregator.into_records(),
        converged,
        attempts: state.attempts,
    })
}
