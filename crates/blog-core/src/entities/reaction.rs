//! Reaction tally - aggregated reactions on one post as seen by the acting user

use std::collections::BTreeMap;

use crate::value_objects::ReactionKind;

/// Reaction counts for a post plus the acting user's own reaction.
///
/// Counts are never stored as zero: a kind whose count drops to zero is removed from the
/// map. When `user_reaction` is `Some(k)` after a local mutation, `count(k) >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReactionTally {
    counts: BTreeMap<ReactionKind, u32>,
    user_reaction: Option<ReactionKind>,
}

impl ReactionTally {
    /// Create an empty tally (no reactions, user has not reacted)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a tally from raw counts, dropping zero entries
    pub fn new(
        counts: impl IntoIterator<Item = (ReactionKind, u32)>,
        user_reaction: Option<ReactionKind>,
    ) -> Self {
        let counts = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .collect();
        Self {
            counts,
            user_reaction,
        }
    }

    /// Count for one kind (0 when absent)
    #[inline]
    pub fn count(&self, kind: ReactionKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// All non-zero counts
    pub fn counts(&self) -> &BTreeMap<ReactionKind, u32> {
        &self.counts
    }

    /// The acting user's current reaction, if any
    #[inline]
    pub fn user_reaction(&self) -> Option<ReactionKind> {
        self.user_reaction
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().map(|count| u64::from(*count)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Check that the user's own reaction is included in its count
    pub fn is_consistent(&self) -> bool {
        self.user_reaction
            .is_none_or(|kind| self.count(kind) >= 1)
    }

    /// Apply a reaction toggle locally and return the resulting tally.
    ///
    /// Toggling the kind the user already holds removes it; toggling any other kind moves
    /// the user's reaction there. A missing previous count is treated as zero and floored
    /// at zero, so a stale snapshot can never produce a negative or zero entry.
    pub fn toggled(&self, kind: ReactionKind) -> Self {
        let mut next = self.clone();
        match self.user_reaction {
            Some(previous) if previous == kind => {
                next.decrement(kind);
                next.user_reaction = None;
            }
            previous => {
                if let Some(previous) = previous {
                    next.decrement(previous);
                }
                next.increment(kind);
                next.user_reaction = Some(kind);
            }
        }
        next
    }

    fn increment(&mut self, kind: ReactionKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    fn decrement(&mut self, kind: ReactionKind) {
        let remaining = self.count(kind).saturating_sub(1);
        if remaining == 0 {
            self.counts.remove(&kind);
        } else {
            self.counts.insert(kind, remaining);
        }
    }
}
