//! Hierarchical comment assembly for one watch page.
//!
//! Comment threads load progressively and nested reply lists only enter the
//! DOM after their "more replies" control is clicked, so every iteration
//! both scrolls and expands. Thread-count growth feeds the same streak rule
//! as the listing loader, parameterized independently.

use anyhow::Result;
use tracing::{debug, info, warn};

use tubeharvest_common::Comment;

use crate::convergence::{ConvergencePolicy, ConvergenceState};
use crate::loader::LoadOutcome;
use crate::surface::CommentSurface;

/// Scroll-and-expand until the thread count stabilizes, returning the
/// flattened parent-then-replies sequence in display order.
///
/// Full re-extraction is expensive, so fields are only read on every
/// `refresh_interval`-th iteration, each read fully replacing the previous
/// one. This is not the listing's first-seen merge: comment identity is too
/// weak to key on, and a later read of the whole section is strictly
/// fresher. The loop can terminate between refresh points, so one final
/// read follows it.
pub async fn assemble_comments<S>(
    surface: &S,
    policy: &ConvergencePolicy,
    refresh_interval: u32,
) -> Result<LoadOutcome<Comment>>
where
    S: CommentSurface + ?Sized,
{
    let refresh_interval = refresh_interval.max(1);
    let mut comments: Vec<Comment> = Vec::new();
    let mut state = ConvergenceState::new();

    while state.should_continue(policy) {
        surface.advance().await?;

        let count = surface.thread_count().await?;
        debug!(threads = count, attempt = state.attempts, "Comment threads visible");

        if state.attempts % refresh_interval == 0 {
            let latest = surface.extract().await?;
            if !latest.is_empty() {
                comments = latest;
            }
        }

        state = state.observe(count);
    }

    let latest = surface.extract().await?;
    if !latest.is_empty() {
        comments = latest;
    }

    let converged = state.converged(policy);
    if !converged {
        warn!(
            attempts = state.attempts,
            threads = state.last_count,
            "Comment load hit its attempt budget before stabilizing"
        );
    }
    info!(
        comments = comments.len(),
        threads = state.last_count,
        attempts = state.attempts,
        converged,
        "Comment assembly finished"
    );

    Ok(LoadOutcome {
        records: comments,
        converged,
        attempts: state.attempts,
    })
}
