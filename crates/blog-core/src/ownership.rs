//! Ownership guard - who may edit or delete a post or comment
//!
//! The rule is the same for every resource: the acting user must be known and must be the
//! resource's author.

use crate::error::DomainError;
use crate::value_objects::UserId;

/// Resources that carry an author
pub trait Authored {
    /// Author of the resource, if known
    fn author_id(&self) -> Option<&UserId>;
}

/// True iff both ids are present and equal
pub fn can_modify(acting_user: Option<&UserId>, author: Option<&UserId>) -> bool {
    matches!((acting_user, author), (Some(acting), Some(author)) if acting == author)
}

/// Gate a mutation: `Unauthenticated` without an acting user, `NotAuthor` for anyone else
pub fn require_owner(acting_user: Option<&UserId>, resource: &impl Authored) -> Result<(), DomainError> {
    let Some(acting) = acting_user else {
        return Err(DomainError::Unauthenticated);
    };
    if can_modify(Some(acting), resource.author_id()) {
        Ok(())
    } else {
        Err(DomainError::NotAuthor)
    }
}
