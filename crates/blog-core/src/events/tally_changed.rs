//! Tally-changed notification
//!
//! Emitted by the reaction store on every transition of a post's tally so observers can
//! re-render from the new snapshot.

use serde::Serialize;

use crate::entities::ReactionTally;
use crate::value_objects::PostId;

/// Which transition produced the new tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TallyPhase {
    /// Seeded from a server snapshot when the post was loaded
    Loaded,
    /// Local optimistic mutation, confirmation pending
    Optimistic,
    /// Replaced by the server's authoritative tally
    Confirmed,
    /// Restored to the pre-toggle snapshot after a failure
    RolledBack,
}

impl TallyPhase {
    /// Whether the tally has settled (no request outstanding)
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Optimistic)
    }
}

/// A post's tally after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyChanged {
    pub post_id: PostId,
    pub tally: ReactionTally,
    pub phase: TallyPhase,
}

impl TallyChanged {
    pub fn new(post_id: PostId, tally: ReactionTally, phase: TallyPhase) -> Self {
        Self {
            post_id,
            tally,
            phase,
        }
    }
}
