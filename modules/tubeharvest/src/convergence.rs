//! Streak-based convergence rule for lazily-loaded lists.
//!
//! There is no authoritative "end of list" signal; the only evidence that
//! loading has finished is that repeated scroll attempts stop producing new
//! items. A single no-growth observation is not reliable (lazy rendering
//! stalls transiently), so convergence requires a streak.

/// Tuning for one loading session.
#[derive(Debug, Clone, Copy)]
pub struct ConvergencePolicy {
    /// Consecutive no-growth observations required before the list is
    /// considered fully loaded.
    pub stability_threshold: u32,
    /// Hard cap on scroll attempts for the session.
    pub max_attempts: u32,
}

/// Per-session counters, advanced one observation at a time. Kept as an
/// explicit value rather than loop-local mutable counters so the rule is
/// unit-testable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvergenceState {
    /// Highest visible count observed so far.
    pub last_count: usize,
    pub no_growth_streak: u32,
    pub attempts: u32,
}

impl ConvergenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one observed visible-count. Growth resets the streak.
    #[must_use]
    pub fn observe(self, count: usize) -> Self {
        if count > self.last_count {
            Self {
                last_count: count,
                no_growth_streak: 0,
                attempts: self.attempts + 1,
            }
        } else {
            Self {
                no_growth_streak: self.no_growth_streak + 1,
                attempts: self.attempts + 1,
                ..self
            }
        }
    }

    pub fn converged(&self, policy: &ConvergencePolicy) -> bool {
        self.no_growth_streak >= policy.stability_threshold
    }

    pub fn exhausted(&self, policy: &ConvergencePolicy) -> bool {
        self.attempts >= policy.max_attempts
    }

    /// Whether the session should issue another scroll.
    pub fn should_continue(&self, policy: &ConvergencePolicy) -> bool {
        !self.converged(policy) && !self.exhausted(policy)
    }
}
