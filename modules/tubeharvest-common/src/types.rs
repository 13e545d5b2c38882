use serde::{Deserialize, Serialize};

/// One video card as captured from a single listing snapshot. The url doubles
/// as the identity key: it stays stable across repeated snapshots even when
/// auxiliary fields (thumbnail, relative timestamps) change between renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub thumbnail: String,
}

impl VideoCandidate {
    /// Usable only when both the link and the thumbnail resolved. Cards
    /// mid-render expose partial fields; those are dropped, not retried.
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.thumbnail.is_empty()
    }
}

/// A harvested video with its flattened comment sequence attached.
/// Assembled once, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub url: String,
    pub title: String,
    pub thumbnail: String,
    pub comments: Vec<Comment>,
}

/// One comment or reply in display order. `is_reply` marks rows nested under
/// the preceding top-level comment. Like counts stay textual ("1.2K").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub like_count: String,
    pub published_at: String,
    pub is_reply: bool,
}
