//! Post entity - a blog post with its reaction state

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::entities::{AuthorSummary, ReactionTally};
use crate::ownership::Authored;
use crate::pagination::Identified;
use crate::value_objects::{PostId, ReactionKind, UserId};

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author: Option<AuthorSummary>,
    /// Aggregated counts per reaction kind
    pub reaction_counts: BTreeMap<ReactionKind, u32>,
    /// Each reacting user's current reaction
    pub user_reactions: HashMap<UserId, ReactionKind>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new Post with no reactions
    pub fn new(id: PostId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            image_url: None,
            author: None,
            reaction_counts: BTreeMap::new(),
            user_reactions: HashMap::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Reaction the given user currently holds on this post
    pub fn reaction_of(&self, user_id: &UserId) -> Option<ReactionKind> {
        self.user_reactions.get(user_id).copied()
    }

    /// Build the reaction tally as seen by `viewer` (anonymous viewers hold no reaction)
    pub fn tally_for(&self, viewer: Option<&UserId>) -> ReactionTally {
        let user_reaction = viewer.and_then(|id| self.reaction_of(id));
        ReactionTally::new(
            self.reaction_counts.iter().map(|(kind, count)| (*kind, *count)),
            user_reaction,
        )
    }

    /// Paragraphs of the post body, split on newlines
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

impl Authored for Post {
    fn author_id(&self) -> Option<&UserId> {
        self.author.as_ref().map(|author| &author.id)
    }
}

impl Identified for Post {
    type Key = PostId;

    fn key(&self) -> PostId {
        self.id.clone()
    }
}
