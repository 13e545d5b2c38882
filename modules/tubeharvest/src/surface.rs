//! The engine's seam to the live page.
//!
//! `ListingSurface` and `CommentSurface` are the only capabilities the
//! convergence loops need, so tests substitute scripted mocks and the
//! production impl runs injected scripts against a WebDriver session.
//! Selector strings and scripts live here, outside the algorithmic core.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use tubeharvest_common::{Comment, VideoCandidate};
use webdriver_client::BrowserSession;

pub const LISTING_CONTAINER: &str = "ytd-rich-grid-renderer";
pub const LISTING_ITEM: &str = "ytd-rich-item-renderer";
pub const WATCH_TITLE: &str = "h1.ytd-video-primary-info-renderer";
pub const COMMENTS_CONTAINER: &str = "ytd-comments";
pub const COMMENT_THREAD: &str = "ytd-comment-thread-renderer";

/// Reads every currently materialized video card. Cards whose link or
/// thumbnail has not resolved yet are omitted by the script itself.
const LISTING_SNAPSHOT_JS: &str = r#"
const out = [];
document.querySelectorAll('ytd-rich-item-renderer').forEach(item => {
    const thumb = item.querySelector('#thumbnail img');
    const link = item.querySelector('a#video-title-link');
    if (!thumb || !link) return;
    const thumbnailUrl = thumb.src || thumb.dataset.src ||
        (thumb.srcset ? thumb.srcset.split(' ')[0] : null);
    if (!link.href || !thumbnailUrl) return;
    out.push({
        url: link.href,
        title: link.getAttribute('title') || '',
        thumbnail: thumbnailUrl
    });
});
return out;
"#;

/// Clicks every visible, not-yet-expanded "more replies" control. Hidden or
/// occluded controls are skipped; nested reply lists are absent from the DOM
/// until expanded.
const EXPAND_REPLIES_JS: &str = r#"
document.querySelectorAll('ytd-button-renderer#more-replies:not([hidden])').forEach(button => {
    if (button.offsetParent !== null) {
        button.click();
    }
});
"#;

/// Flattens every thread to parent-then-replies order. A thread or reply
/// missing a field is skipped individually, never failing the batch.
const COMMENT_SNAPSHOT_JS: &str = r#"
const comments = [];
document.querySelectorAll('ytd-comment-thread-renderer').forEach(thread => {
    try {
        const main = thread.querySelector('#comment');
        if (!main) return;

        comments.push({
            author: main.querySelector('#author-text').textContent.trim(),
            text: main.querySelector('#content-text').textContent.trim(),
            like_count: main.querySelector('#vote-count-middle').textContent.trim() || '0',
            published_at: main.querySelector('#published-time-text').textContent.trim(),
            is_reply: false
        });

        thread.querySelectorAll('ytd-comment-renderer.ytd-comment-replies-renderer').forEach(reply => {
            try {
                comments.push({
                    author: reply.querySelector('#author-text').textContent.trim(),
                    text: reply.querySelector('#content-text').textContent.trim(),
                    like_count: reply.querySelector('#vote-count-middle').textContent.trim() || '0',
                    published_at: reply.querySelector('#published-time-text').textContent.trim(),
                    is_reply: true
                });
            } catch (e) {
                // skip this reply only
            }
        });
    } catch (e) {
        // skip this thread only
    }
});
return comments;
"#;

/// A channel listing: can be driven forward and read out.
#[async_trait]
pub trait ListingSurface: Send + Sync {
    /// Drive more content into view: scroll to the bottom, then wait out the
    /// settle period so animation/network-triggered rendering can land.
    async fn advance(&self) -> Result<()>;

    /// Raw count of materialized cards, resolved or not. This drives
    /// convergence: a freshly rendered card whose link has not resolved yet
    /// is still growth.
    async fn visible_count(&self) -> Result<usize>;

    /// Pure read of the currently materialized video cards. Empty page means
    /// an empty vec, never an error.
    async fn snapshot(&self) -> Result<Vec<VideoCandidate>>;
}

/// Session-level actions the orchestrator needs beyond the two scroll
/// surfaces: navigation, bounded presence checks, and single-element reads.
/// Split out so harvest orchestration is testable without a browser.
#[async_trait]
pub trait HarvestSession: Send + Sync {
    /// Navigate and allow the page its initial settle.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Bounded wait for `css` to exist. Expiry is a recoverable outcome,
    /// reported as `false`.
    async fn wait_for_present(&self, css: &str, timeout: Duration) -> Result<bool>;

    /// Bring `css` into view; lazy sections only start rendering once
    /// visible. A missing element is reported, not raised.
    async fn scroll_into_view(&self, css: &str) -> Result<bool>;

    /// First matching element's trimmed text, if present.
    async fn text_of(&self, css: &str) -> Result<Option<String>>;
}

/// A watch page's comment section.
#[async_trait]
pub trait CommentSurface: Send + Sync {
    /// Scroll to the bottom and expand any visible reply controls, then wait
    /// out the settle period.
    async fn advance(&self) -> Result<()>;

    /// Count of materialized top-level threads. Cheaper than extraction.
    async fn thread_count(&self) -> Result<usize>;

    /// Full flattened extraction of every thread currently in the DOM.
    async fn extract(&self) -> Result<Vec<Comment>>;
}

/// Production surface backed by the live WebDriver session.
pub struct LiveSurface<'a> {
    session: &'a BrowserSession,
    settle: Duration,
}

impl<'a> LiveSurface<'a> {
    pub fn new(session: &'a BrowserSession, settle: Duration) -> Self {
        Self { session, settle }
    }
}

/// Extra settle after navigation before touching the page.
const NAVIGATION_SETTLE: Duration = Duration::from_secs(5);

#[async_trait]
impl HarvestSession for LiveSurface<'_> {
    async fn goto(&self, url: &str) -> Result<()> {
        self.session.goto(url).await.context("Navigation failed")?;
        tokio::time::sleep(NAVIGATION_SETTLE).await;
        Ok(())
    }

    async fn wait_for_present(&self, css: &str, timeout: Duration) -> Result<bool> {
        Ok(self.session.wait_for_present(css, timeout).await?)
    }

    async fn scroll_into_view(&self, css: &str) -> Result<bool> {
        let found = self.session.scroll_into_view(css).await?;
        tokio::time::sleep(self.settle).await;
        Ok(found)
    }

    async fn text_of(&self, css: &str) -> Result<Option<String>> {
        Ok(self.session.text_of(css).await?)
    }
}

#[async_trait]
impl ListingSurface for LiveSurface<'_> {
    async fn advance(&self) -> Result<()> {
        self.session
            .scroll_to_bottom()
            .await
            .context("Scroll failed on the listing page")?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    async fn visible_count(&self) -> Result<usize> {
        self.session
            .count(LISTING_ITEM)
            .await
            .context("Card count read failed")
    }

    async fn snapshot(&self) -> Result<Vec<VideoCandidate>> {
        let value = self
            .session
            .execute_json(LISTING_SNAPSHOT_JS)
            .await
            .context("Listing snapshot script failed")?;
        Ok(decode_candidates(value))
    }
}

#[async_trait]
impl CommentSurface for LiveSurface<'_> {
    async fn advance(&self) -> Result<()> {
        self.session
            .scroll_to_bottom()
            .await
            .context("Scroll failed on the watch page")?;
        self.session
            .execute_json(EXPAND_REPLIES_JS)
            .await
            .context("Reply expansion script failed")?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    async fn thread_count(&self) -> Result<usize> {
        self.session
            .count(COMMENT_THREAD)
            .await
            .context("Thread count read failed")
    }

    async fn extract(&self) -> Result<Vec<Comment>> {
        let value = self
            .session
            .execute_json(COMMENT_SNAPSHOT_JS)
            .await
            .context("Comment snapshot script failed")?;
        Ok(decode_comments(value))
    }
}

/// Decode the listing script result, dropping entries that do not
/// deserialize. One malformed card never fails the snapshot.
fn decode_candidates(value: Value) -> Vec<VideoCandidate> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Decode the comment script result with the same per-entry tolerance.
fn decode_comments(value: Value) -> Vec<Comment> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
