//! Reaction store
//!
//! Holds the reaction tally of every post in view and applies reaction toggles
//! optimistically: the local tally changes before the request is sent, and is then either
//! replaced by the server's tally or restored from the snapshot taken before the change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use blog_common::Session;
use blog_core::{
    DomainError, Post, PostId, ReactionApi, ReactionKind, ReactionTally, TallyChanged, TallyPhase,
    UserId,
};

use super::SyncResult;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default)]
struct TallyEntry {
    tally: ReactionTally,
    /// Token of the pending toggle that owns this entry
    in_flight: Option<u64>,
}

/// Per-post reaction tallies with optimistic toggling
pub struct ReactionStore {
    api: Arc<dyn ReactionApi>,
    session: Session,
    tallies: DashMap<PostId, TallyEntry>,
    events: broadcast::Sender<TallyChanged>,
    next_toggle: AtomicU64,
}

impl ReactionStore {
    pub fn new(api: Arc<dyn ReactionApi>, session: Session) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            session,
            tallies: DashMap::new(),
            events,
            next_toggle: AtomicU64::new(1),
        }
    }

    /// Receive a notification for every tally transition
    pub fn subscribe(&self) -> broadcast::Receiver<TallyChanged> {
        self.events.subscribe()
    }

    /// Current tally of a post, if it is tracked
    pub fn get(&self, post_id: &PostId) -> Option<ReactionTally> {
        self.tallies.get(post_id).map(|entry| entry.tally.clone())
    }

    pub fn is_in_flight(&self, post_id: &PostId) -> bool {
        self.tallies
            .get(post_id)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    /// Seed a tally from a server snapshot.
    ///
    /// Ignored while a toggle for the post is in flight; returns whether it was applied.
    pub fn load(&self, post_id: &PostId, tally: ReactionTally) -> bool {
        {
            let mut entry = self.tallies.entry(post_id.clone()).or_default();
            if entry.in_flight.is_some() {
                debug!(post_id = %post_id, "Toggle in flight, keeping local tally");
                return false;
            }
            entry.tally = tally.clone();
        }
        self.publish(post_id, tally, TallyPhase::Loaded);
        true
    }

    /// Seed a post's tally as seen by the signed-in user
    pub fn track_post(&self, post: &Post) -> bool {
        let viewer = self.session.current_user_id();
        self.load(&post.id, post.tally_for(viewer.as_ref()))
    }

    /// Stop tracking a post (a pending toggle for it settles without re-adding it)
    pub fn forget(&self, post_id: &PostId) {
        self.tallies.remove(post_id);
    }

    /// Toggle `kind` on a post for the signed-in user
    pub async fn toggle(&self, post_id: &PostId, kind: ReactionKind) -> SyncResult<ReactionTally> {
        let acting = self.session.current_user_id();
        self.toggle_as(post_id, kind, acting.as_ref()).await
    }

    /// Toggle `kind` on a post for `acting_user`.
    ///
    /// Rejected with `Unauthenticated` without a user and with `AlreadyInFlight` while a
    /// previous toggle on the same post is pending. On failure the tally is restored to
    /// exactly what it was before the call and the error is returned.
    #[instrument(skip(self))]
    pub async fn toggle_as(
        &self,
        post_id: &PostId,
        kind: ReactionKind,
        acting_user: Option<&UserId>,
    ) -> SyncResult<ReactionTally> {
        if acting_user.is_none() {
            return Err(DomainError::Unauthenticated);
        }

        let pending = self.begin(post_id, kind)?;

        match self.api.toggle_reaction(post_id, kind).await {
            Ok(confirmed) => Ok(pending.confirm(confirmed)),
            Err(err) => {
                pending.rollback();
                Err(err)
            }
        }
    }

    /// Apply the optimistic change and mark the post busy
    fn begin(&self, post_id: &PostId, kind: ReactionKind) -> SyncResult<PendingToggle<'_>> {
        let token = self.next_toggle.fetch_add(1, Ordering::Relaxed);
        let (rollback, optimistic) = {
            let mut entry = self.tallies.entry(post_id.clone()).or_default();
            if entry.in_flight.is_some() {
                return Err(DomainError::AlreadyInFlight(post_id.clone()));
            }
            let rollback = entry.tally.clone();
            let optimistic = rollback.toggled(kind);
            entry.tally = optimistic.clone();
            entry.in_flight = Some(token);
            (rollback, optimistic)
        };

        debug!(post_id = %post_id, kind = %kind, "Optimistic reaction applied");
        self.publish(post_id, optimistic, TallyPhase::Optimistic);

        Ok(PendingToggle {
            store: self,
            post_id: post_id.clone(),
            token,
            rollback: Some(rollback),
        })
    }

    /// Write a settled tally if the entry still belongs to toggle `token`.
    ///
    /// A forgotten post, or one re-tracked and toggled again since, is left alone.
    fn settle(&self, post_id: &PostId, token: u64, tally: ReactionTally) -> bool {
        match self.tallies.get_mut(post_id) {
            Some(mut entry) if entry.in_flight == Some(token) => {
                entry.tally = tally;
                entry.in_flight = None;
                true
            }
            _ => false,
        }
    }

    fn publish(&self, post_id: &PostId, tally: ReactionTally, phase: TallyPhase) {
        // No subscribers is fine
        self.events
            .send(TallyChanged::new(post_id.clone(), tally, phase))
            .ok();
    }
}

/// An applied optimistic toggle awaiting the server.
///
/// Dropping it unsettled (e.g. the caller's future was cancelled) rolls back.
struct PendingToggle<'a> {
    store: &'a ReactionStore,
    post_id: PostId,
    token: u64,
    rollback: Option<ReactionTally>,
}

impl PendingToggle<'_> {
    /// Replace the tally wholesale with the server's
    fn confirm(mut self, confirmed: ReactionTally) -> ReactionTally {
        self.rollback = None;
        if self.store.settle(&self.post_id, self.token, confirmed.clone()) {
            info!(
                post_id = %self.post_id,
                total = confirmed.total(),
                "Reaction confirmed"
            );
            self.store
                .publish(&self.post_id, confirmed.clone(), TallyPhase::Confirmed);
        }
        confirmed
    }

    fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        let Some(rollback) = self.rollback.take() else {
            return;
        };
        if self.store.settle(&self.post_id, self.token, rollback.clone()) {
            warn!(post_id = %self.post_id, "Reaction rolled back");
            self.store
                .publish(&self.post_id, rollback, TallyPhase::RolledBack);
        }
    }
}

impl Drop for PendingToggle<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}
