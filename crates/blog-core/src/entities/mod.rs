//! Domain entities - core business objects

mod comment;
mod forms;
mod post;
mod reaction;
mod user;

pub use comment::Comment;
pub use forms::{ImageSource, ImageUpload, LoginForm, PostDraft, ProfileChanges, SignupForm, PICTURE_CONTENT_TYPES};
pub use post::Post;
pub use reaction::ReactionTally;
pub use user::{AuthorSummary, User};
