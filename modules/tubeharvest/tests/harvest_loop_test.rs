// Scripted-surface tests for the convergence loops: no browser, no network.
//
// ScriptedListing / ScriptedComments replay a fixed sequence of snapshots
// and keep serving the final one once the script runs out, the way a real
// page keeps rendering the same converged DOM.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use tubeharvest::comments::assemble_comments;
use tubeharvest::convergence::ConvergencePolicy;
use tubeharvest::loader::load_listing;
use tubeharvest::surface::{CommentSurface, ListingSurface};
use tubeharvest_common::{Comment, VideoCandidate};

fn candidate(n: usize) -> VideoCandidate {
    VideoCandidate {
        url: format!("https://example.com/watch?v={n}"),
        title: format!("video {n}"),
        thumbnail: format!("https://example.com/thumb/{n}.jpg"),
    }
}

/// First `n` candidates of the synthetic listing, in display order.
fn prefix(n: usize) -> Vec<VideoCandidate> {
    (1..=n).map(candidate).collect()
}

fn comment(author: &str, is_reply: bool) -> Comment {
    Comment {
        author: author.to_string(),
        text: format!("{author} wrote this"),
        like_count: "0".to_string(),
        published_at: "1 day ago".to_string(),
        is_reply,
    }
}

struct ScriptedListing {
    snapshots: Mutex<VecDeque<Vec<VideoCandidate>>>,
    last: Mutex<Vec<VideoCandidate>>,
    snapshot_calls: AtomicUsize,
}

impl ScriptedListing {
    fn new(snapshots: Vec<Vec<VideoCandidate>>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots.into()),
            last: Mutex::new(Vec::new()),
            snapshot_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ListingSurface for ScriptedListing {
    async fn advance(&self) -> Result<()> {
        Ok(())
    }

    async fn visible_count(&self) -> Result<usize> {
        let queue = self.snapshots.lock().unwrap();
        match queue.front() {
            Some(snapshot) => Ok(snapshot.len()),
            None => Ok(self.last.lock().unwrap().len()),
        }
    }

    async fn snapshot(&self) -> Result<Vec<VideoCandidate>> {
        self.snapshot_calls.fetch_add(1, Ordering::Relaxed);
        let mut queue = self.snapshots.lock().unwrap();
        match queue.pop_front() {
            Some(snapshot) => {
                *self.last.lock().unwrap() = snapshot.clone();
                Ok(snapshot)
            }
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

struct ScriptedComments {
    counts: Mutex<VecDeque<usize>>,
    last_count: AtomicUsize,
    extractions: Mutex<VecDeque<Vec<Comment>>>,
    last_extraction: Mutex<Vec<Comment>>,
    extract_calls: AtomicUsize,
}

impl ScriptedComments {
    fn new(counts: Vec<usize>, extractions: Vec<Vec<Comment>>) -> Self {
        Self {
            counts: Mutex::new(counts.into()),
            last_count: AtomicUsize::new(0),
            extractions: Mutex::new(extractions.into()),
            last_extraction: Mutex::new(Vec::new()),
            extract_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CommentSurface for ScriptedComments {
    async fn advance(&self) -> Result<()> {
        Ok(())
    }

    async fn thread_count(&self) -> Result<usize> {
        let mut queue = self.counts.lock().unwrap();
        match queue.pop_front() {
            Some(count) => {
                self.last_count.store(count, Ordering::Relaxed);
                Ok(count)
            }
            None => Ok(self.last_count.load(Ordering::Relaxed)),
        }
    }

    async fn extract(&self) -> Result<Vec<Comment>> {
        self.extract_calls.fetch_add(1, Ordering::Relaxed);
        let mut queue = self.extractions.lock().unwrap();
        match queue.pop_front() {
            Some(extraction) => {
                *self.last_extraction.lock().unwrap() = extraction.clone();
                Ok(extraction)
            }
            None => Ok(self.last_extraction.lock().unwrap().clone()),
        }
    }
}

#[tokio::test]
async fn listing_converges_exactly_on_the_fourth_repeat() {
    // Visible-count sequence 3,5,5,5,8,8,8,8: the three 5s never complete a
    // streak of three, and only the fourth 8 does.
    let surface = ScriptedListing::new(vec![
        prefix(3),
        prefix(5),
        prefix(5),
        prefix(5),
        prefix(8),
        prefix(8),
        prefix(8),
        prefix(8),
    ]);
    let policy = ConvergencePolicy {
        stability_threshold: 3,
        max_attempts: 50,
    };

    let outcome = load_listing(&surface, &policy).await.unwrap();

    assert!(outcome.converged);
    assert_eq!(outcome.attempts, 8);
    assert_eq!(surface.snapshot_calls.load(Ordering::Relaxed), 8);
    assert_eq!(outcome.records.len(), 8);
}

#[tokio::test]
async fn listing_stops_after_attempt_budget_when_growth_never_ends() {
    let surface = ScriptedListing::new((1..=20).map(prefix).collect());
    let policy = ConvergencePolicy {
        stability_threshold: 3,
        max_attempts: 5,
    };

    let outcome = load_listing(&surface, &policy).await.unwrap();

    assert!(!outcome.converged);
    assert_eq!(outcome.attempts, 5);
    assert_eq!(outcome.records.len(), 5);
}

#[tokio::test]
async fn listing_dedups_across_snapshots_in_first_seen_order() {
    // Keys v1,v2 then v2,v3 across two scroll snapshots: exactly three
    // records, in first-appearance order.
    let surface = ScriptedListing::new(vec![
        vec![candidate(1), candidate(2)],
        vec![candidate(2), candidate(3)],
    ]);
    let policy = ConvergencePolicy {
        stability_threshold: 3,
        max_attempts: 10,
    };

    let outcome = load_listing(&surface, &policy).await.unwrap();

    let urls: Vec<_> = outcome.records.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com/watch?v=1",
            "https://example.com/watch?v=2",
            "https://example.com/watch?v=3",
        ]
    );
    assert!(outcome.converged);
}

/// Listing whose raw card count keeps growing while only a fixed prefix of
/// cards has resolved links and thumbnails.
struct StalledResolutionListing {
    counts: Mutex<VecDeque<usize>>,
    last_count: AtomicUsize,
    resolved: Vec<VideoCandidate>,
}

#[async_trait]
impl ListingSurface for StalledResolutionListing {
    async fn advance(&self) -> Result<()> {
        Ok(())
    }

    async fn visible_count(&self) -> Result<usize> {
        match self.counts.lock().unwrap().pop_front() {
            Some(count) => {
                self.last_count.store(count, Ordering::Relaxed);
                Ok(count)
            }
            None => Ok(self.last_count.load(Ordering::Relaxed)),
        }
    }

    async fn snapshot(&self) -> Result<Vec<VideoCandidate>> {
        Ok(self.resolved.clone())
    }
}

#[tokio::test]
async fn unresolved_cards_still_count_as_growth() {
    // Cards keep materializing faster than their links resolve; the stalled
    // extracted-set size must not complete a no-growth streak.
    let surface = StalledResolutionListing {
        counts: Mutex::new(vec![4, 6, 8, 10, 12].into()),
        last_count: AtomicUsize::new(0),
        resolved: prefix(3),
    };
    let policy = ConvergencePolicy {
        stability_threshold: 3,
        max_attempts: 5,
    };

    let outcome = load_listing(&surface, &policy).await.unwrap();

    assert!(!outcome.converged);
    assert_eq!(outcome.attempts, 5);
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test]
async fn comment_assembly_preserves_parent_then_replies_order() {
    let thread = vec![
        comment("parent", false),
        comment("reply1", true),
        comment("reply2", true),
    ];
    let surface = ScriptedComments::new(vec![1, 1, 1, 1], vec![thread.clone()]);
    let policy = ConvergencePolicy {
        stability_threshold: 3,
        max_attempts: 30,
    };

    let outcome = assemble_comments(&surface, &policy, 5).await.unwrap();

    assert_eq!(outcome.records, thread);
    let flags: Vec<_> = outcome.records.iter().map(|c| c.is_reply).collect();
    assert_eq!(flags, vec![false, true, true]);
}

#[tokio::test]
async fn comment_extraction_runs_on_cadence_plus_final_read() {
    // Unbounded growth capped at 6 attempts with a cadence of 2: extraction
    // on attempts 0, 2, 4 plus the final read after the loop.
    let surface = ScriptedComments::new(
        (1..=20).collect(),
        vec![
            vec![comment("first", false)],
            vec![comment("second", false)],
            vec![comment("third", false)],
            vec![comment("final", false), comment("final-reply", true)],
        ],
    );
    let policy = ConvergencePolicy {
        stability_threshold: 3,
        max_attempts: 6,
    };

    let outcome = assemble_comments(&surface, &policy, 2).await.unwrap();

    assert_eq!(surface.extract_calls.load(Ordering::Relaxed), 4);
    // Last extraction wins wholesale; earlier reads are fully replaced.
    assert_eq!(outcome.records[0].author, "final");
    assert_eq!(outcome.records.len(), 2);
    assert!(!outcome.converged);
}

#[tokio::test]
async fn empty_extraction_never_clobbers_an_earlier_one() {
    let surface = ScriptedComments::new(
        vec![2, 2, 2, 2],
        vec![
            vec![comment("kept", false)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ],
    );
    let policy = ConvergencePolicy {
        stability_threshold: 3,
        max_attempts: 30,
    };

    let outcome = assemble_comments(&surface, &policy, 1).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].author, "kept");
}
