//! Boundary conversions between wire DTOs and domain types
//!
//! The reaction tally has exactly one conversion in each direction: `tally_from_wire` and
//! `tally_to_wire`.

use std::collections::{BTreeMap, HashMap};

use blog_core::{
    AuthorSummary, Comment, CommentId, Post, PostId, ReactionKind, ReactionTally, User, UserId,
};
use tracing::warn;

use crate::dto::{AuthorDto, CommentDto, IdOnly, PostDto, Ref, UserDto};

/// Build a tally from the wire count map and the caller's reaction.
///
/// Unknown kinds are skipped and zero counts dropped.
pub fn tally_from_wire(counts: &HashMap<String, u32>, user_reaction: Option<&str>) -> ReactionTally {
    let counts = parse_counts(counts);
    let user_reaction = user_reaction.and_then(parse_kind);
    ReactionTally::new(counts, user_reaction)
}

/// Wire form of a tally: count map keyed by lowercase kind, plus the caller's reaction
pub fn tally_to_wire(tally: &ReactionTally) -> (HashMap<String, u32>, Option<String>) {
    let counts = tally
        .counts()
        .iter()
        .map(|(kind, count)| (kind.as_str().to_string(), *count))
        .collect();
    (counts, tally.user_reaction().map(|kind| kind.as_str().to_string()))
}

fn parse_kind(raw: &str) -> Option<ReactionKind> {
    match raw.parse() {
        Ok(kind) => Some(kind),
        Err(err) => {
            warn!(error = %err, "Skipping unknown reaction kind");
            None
        }
    }
}

fn parse_counts(counts: &HashMap<String, u32>) -> BTreeMap<ReactionKind, u32> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .filter_map(|(raw, count)| parse_kind(raw).map(|kind| (kind, *count)))
        .collect()
}

pub fn user_from_wire(dto: UserDto) -> User {
    User {
        id: UserId::from(dto.id),
        username: dto.username,
        email: dto.email,
        profile_picture_url: dto.profile_picture_url,
        created_at: dto.created_at,
    }
}

fn author_from_wire(author: Ref<AuthorDto>) -> AuthorSummary {
    match author {
        Ref::Populated(dto) => AuthorSummary {
            id: UserId::from(dto.id),
            username: dto.username.unwrap_or_default(),
            profile_picture_url: dto.profile_picture_url,
        },
        Ref::Id(id) => AuthorSummary::new(UserId::from(id), String::new()),
    }
}

pub fn post_from_wire(dto: PostDto) -> Post {
    let user_reactions = dto
        .user_reactions
        .iter()
        .filter_map(|(user, raw)| parse_kind(raw).map(|kind| (UserId::from(user.as_str()), kind)))
        .collect();

    Post {
        id: PostId::from(dto.id),
        title: dto.title,
        content: dto.content,
        image_url: dto.image_url.filter(|url| !url.is_empty()),
        author: dto.author.map(author_from_wire),
        reaction_counts: parse_counts(&dto.reaction_counts),
        user_reactions,
        created_at: dto.created_at,
        updated_at: dto.updated_at,
    }
}

/// Map a comment; `post_id` fills in when the body does not name its post
pub fn comment_from_wire(dto: CommentDto, post_id: Option<&PostId>) -> Comment {
    let post_id = match dto.post {
        Some(Ref::Populated(IdOnly { id }) | Ref::Id(id)) => PostId::from(id),
        None => post_id.cloned().unwrap_or_default(),
    };

    Comment {
        id: CommentId::from(dto.id),
        post_id,
        content: dto.content,
        author: dto.author.map(author_from_wire),
        created_at: dto.created_at,
        updated_at: dto.updated_at,
    }
}
