//! Harvest orchestration: listing load, then per-video comment assembly.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use tubeharvest_common::{Config, Video, VideoCandidate};

use crate::comments;
use crate::convergence::ConvergencePolicy;
use crate::loader;
use crate::surface::{self, CommentSurface, HarvestSession, ListingSurface};

/// Bound on waiting for the video grid to exist at all.
const LISTING_WAIT: Duration = Duration::from_secs(20);
/// Bound on waiting for the comment section container.
const COMMENTS_WAIT: Duration = Duration::from_secs(20);
/// Bound on waiting for the first thread once the section is in view.
const FIRST_COMMENT_WAIT: Duration = Duration::from_secs(10);

/// Drives the whole harvest over one page session. Generic over the surface
/// traits so the flow is testable against a scripted channel.
pub struct Harvester<'a, S> {
    session: &'a S,
    config: &'a Config,
}

impl<'a, S> Harvester<'a, S>
where
    S: HarvestSession + ListingSurface + CommentSurface,
{
    pub fn new(session: &'a S, config: &'a Config) -> Self {
        Self { session, config }
    }

    /// Harvest the whole channel: deduplicated listing first, then each
    /// video's comment tree. Per-video failures are isolated: one video's
    /// navigation or extraction error is logged and that video skipped,
    /// never propagated.
    pub async fn harvest(&self, entry_url: &str) -> Result<Vec<Video>> {
        let listing_url = normalize_channel_url(entry_url);
        info!(url = listing_url.as_str(), "Opening channel listing");

        self.session
            .goto(&listing_url)
            .await
            .context("Failed to open the channel listing")?;

        if !self
            .session
            .wait_for_present(surface::LISTING_CONTAINER, LISTING_WAIT)
            .await?
        {
            warn!("Video grid never appeared; treating the listing as empty");
            return Ok(Vec::new());
        }

        let policy = ConvergencePolicy {
            stability_threshold: self.config.listing_stability_threshold,
            max_attempts: self.config.listing_max_attempts,
        };
        let outcome = loader::load_listing(self.session, &policy).await?;
        info!(
            videos = outcome.records.len(),
            converged = outcome.converged,
            "Channel listing harvested"
        );

        let mut videos = Vec::with_capacity(outcome.records.len());
        for candidate in outcome.records {
            match self.harvest_video(&candidate).await {
                Ok(video) => videos.push(video),
                Err(err) => {
                    warn!(url = candidate.url.as_str(), error = %err, "Skipping video");
                }
            }
        }

        Ok(videos)
    }

    /// Visit one watch page and populate its comment sequence.
    async fn harvest_video(&self, candidate: &VideoCandidate) -> Result<Video> {
        self.session
            .goto(&candidate.url)
            .await
            .context("Failed to open the watch page")?;

        // The watch page heading is fresher than the listing card, but the
        // card title is a fine fallback when the heading hasn't rendered.
        let title = self
            .session
            .text_of(surface::WATCH_TITLE)
            .await?
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| candidate.title.clone());

        info!(title = title.as_str(), "Harvesting comments");

        let comments = if self.prepare_comment_section().await? {
            let policy = ConvergencePolicy {
                stability_threshold: self.config.comment_stability_threshold,
                max_attempts: self.config.comment_max_attempts,
            };
            comments::assemble_comments(
                self.session,
                &policy,
                self.config.comment_refresh_interval,
            )
            .await?
            .records
        } else {
            warn!(url = candidate.url.as_str(), "Comment section never appeared");
            Vec::new()
        };

        Ok(Video {
            url: candidate.url.clone(),
            title,
            thumbnail: candidate.thumbnail.clone(),
            comments,
        })
    }

    /// Bring the comment section into view. Returns false when the container
    /// never materialized within its bound; that degrades the video to zero
    /// comments rather than failing it.
    async fn prepare_comment_section(&self) -> Result<bool> {
        if !self
            .session
            .wait_for_present(surface::COMMENTS_CONTAINER, COMMENTS_WAIT)
            .await?
        {
            return Ok(false);
        }

        self.session
            .scroll_into_view(surface::COMMENTS_CONTAINER)
            .await?;

        // Comments may legitimately never render (disabled on the video);
        // the assembler copes with an empty section either way.
        let _ = self
            .session
            .wait_for_present(surface::COMMENT_THREAD, FIRST_COMMENT_WAIT)
            .await?;

        Ok(true)
    }
}

/// Normalize any channel-ish entry URL to its /videos listing.
pub fn normalize_channel_url(entry: &str) -> String {
    let trimmed = entry.trim_end_matches('/');
    if trimmed.ends_with("/videos") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/videos")
    }
}
