//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod token;
pub mod user;

pub use comment::{CommentDetail, CommentService, CreateCommentInput, UpdateCommentInput};
pub use follow::{CreateFollowInput, FollowDetail, FollowService};
pub use group::{CreateGroupInput, GroupService, UpdateGroupInput, slugify};
pub use post::{CreatePostInput, PostDetail, PostService, UpdatePostInput};
pub use token::{Claims, TokenPair, TokenService, TokenType};
pub use user::{CreateUserInput, UserService};

use validator::ValidationError;

/// Reject empty or whitespace-only text.
pub(crate) fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("This field may not be blank.".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("hello").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \n\t").is_err());
    }
}
