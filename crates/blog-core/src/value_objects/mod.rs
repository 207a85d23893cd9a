//! Value objects - immutable types that represent domain concepts

mod ids;
mod reaction_kind;

pub use ids::{CommentId, PostId, UserId};
pub use reaction_kind::{ParseReactionKindError, ReactionKind};
