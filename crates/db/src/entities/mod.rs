//! Database entities.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use group::Entity as Group;
pub use post::Entity as Post;
pub use user::Entity as User;

/// Maximum number of characters shown when a text-bearing model is displayed.
pub const LABEL_LENGTH: usize = 15;

/// Cut `text` down to [`LABEL_LENGTH`] characters.
pub(crate) fn truncate_label(text: &str) -> &str {
    match text.char_indices().nth(LABEL_LENGTH) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
