//! Order-preserving, first-seen-wins aggregation of listing snapshots.

use std::collections::HashSet;

use tubeharvest_common::VideoCandidate;

/// Merges repeated snapshots of the same lazily-rendered list into one
/// canonical collection keyed by url. First-seen wins: later renders can show
/// transient states (half-loaded thumbnails), so an already-seen url never
/// refreshes the stored fields. Insertion order matches page display order.
#[derive(Debug, Default)]
pub struct Aggregator {
    seen: HashSet<String>,
    records: Vec<VideoCandidate>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one snapshot. Candidates without a usable url or thumbnail are
    /// excluded entirely; the rest of the batch is unaffected.
    pub fn merge(&mut self, incoming: Vec<VideoCandidate>) {
        for candidate in incoming {
            if !candidate.is_complete() {
                continue;
            }
            if self.seen.insert(candidate.url.clone()) {
                self.records.push(candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<VideoCandidate> {
        self.records
    }
}
