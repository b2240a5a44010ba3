//! Comment service.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use validator::Validate;
use yatube_common::{AppError, AppResult};
use yatube_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};

use super::validate_not_blank;

/// A comment together with its author's username.
#[derive(Debug, Clone)]
pub struct CommentDetail {
    pub comment: comment::Model,
    pub author: String,
}

/// Input for creating a comment. The post comes from the URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
}

/// Input for replacing or patching a comment.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCommentInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: Option<String>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
        }
    }

    /// List the comments of a post.
    pub async fn list(&self, post_id: i64) -> AppResult<Vec<CommentDetail>> {
        self.post_repo.get_by_id(post_id).await?;
        let comments = self.comment_repo.find_by_post(post_id).await?;

        let mut author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let usernames: HashMap<i64, String> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        comments
            .into_iter()
            .map(|comment| {
                let author = usernames.get(&comment.author_id).cloned().ok_or_else(|| {
                    AppError::Internal(format!(
                        "Author {} of comment {} missing",
                        comment.author_id, comment.id
                    ))
                })?;
                Ok(CommentDetail { comment, author })
            })
            .collect()
    }

    /// Get a comment of a post.
    pub async fn get(&self, post_id: i64, id: i64) -> AppResult<CommentDetail> {
        self.post_repo.get_by_id(post_id).await?;
        let comment = self.comment_repo.get_in_post(post_id, id).await?;
        let author = self.user_repo.get_by_id(comment.author_id).await?;

        Ok(CommentDetail {
            comment,
            author: author.username,
        })
    }

    /// Comment on a post as `author`.
    pub async fn create(
        &self,
        post_id: i64,
        author: &user::Model,
        input: CreateCommentInput,
    ) -> AppResult<CommentDetail> {
        self.post_repo.get_by_id(post_id).await?;
        input.validate()?;

        let model = comment::ActiveModel {
            author_id: Set(author.id),
            post_id: Set(post_id),
            text: Set(input.text),
            created: Set(Utc::now().into()),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(
            comment_id = comment.id,
            post_id,
            author_id = author.id,
            comment = %comment,
            "Created comment"
        );

        Ok(CommentDetail {
            comment,
            author: author.username.clone(),
        })
    }

    /// Update a comment. A full update requires `text`.
    pub async fn update(
        &self,
        existing: CommentDetail,
        input: UpdateCommentInput,
        partial: bool,
    ) -> AppResult<CommentDetail> {
        if !partial && input.text.is_none() {
            return Err(AppError::Validation("text: This field is required.".to_string()));
        }
        input.validate()?;

        let Some(text) = input.text else {
            return Ok(existing);
        };

        let mut model = existing.comment.into_active_model();
        model.text = Set(text);
        let comment = self.comment_repo.update(model).await?;

        tracing::info!(comment_id = comment.id, comment = %comment, "Updated comment");

        Ok(CommentDetail {
            comment,
            author: existing.author,
        })
    }

    /// Delete a comment.
    pub async fn delete(&self, existing: CommentDetail) -> AppResult<()> {
        self.comment_repo.delete(existing.comment.id).await?;
        tracing::info!(comment_id = existing.comment.id, "Deleted comment");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use yatube_db::entities::post;

    fn create_test_user(id: i64, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            password: "hash".to_string(),
            is_staff: false,
            date_joined: Utc::now().into(),
        }
    }

    fn create_test_post(id: i64) -> post::Model {
        post::Model {
            id,
            text: "hello".to_string(),
            pub_date: Utc::now().into(),
            author_id: 1,
            image: None,
            group_id: None,
        }
    }

    fn create_test_comment(id: i64, post_id: i64, author_id: i64) -> comment::Model {
        comment::Model {
            id,
            author_id,
            post_id,
            text: "nice post".to_string(),
            created: Utc::now().into(),
        }
    }

    fn create_test_service(db: DatabaseConnection) -> CommentService {
        let db = Arc::new(db);
        CommentService::new(
            CommentRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_list_for_unknown_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let service = create_test_service(db);
        assert!(matches!(
            service.list(404).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_attaches_authors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post(1)]])
            .append_query_results([[create_test_comment(1, 1, 2), create_test_comment(2, 1, 2)]])
            .append_query_results([[create_test_user(2, "anna")]])
            .into_connection();

        let service = create_test_service(db);
        let comments = service.list(1).await.unwrap();

        assert_eq!(comments.len(), 2);
        assert!(comments.iter().all(|c| c.author == "anna"));
    }

    #[tokio::test]
    async fn test_create_under_unknown_post_writes_nothing() {
        // Only the post lookup is mocked; an insert would fail the test.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let service = create_test_service(db);
        let result = service
            .create(
                99,
                &create_test_user(2, "anna"),
                CreateCommentInput {
                    text: "hello?".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_forces_post_and_author() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post(1)]])
            .append_query_results([[create_test_comment(5, 1, 2)]])
            .into_connection();

        let service = create_test_service(db);
        let detail = service
            .create(
                1,
                &create_test_user(2, "anna"),
                CreateCommentInput {
                    text: "nice post".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.comment.post_id, 1);
        assert_eq!(detail.author, "anna");
    }

    #[tokio::test]
    async fn test_partial_update_without_text_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = create_test_service(db);
        let existing = CommentDetail {
            comment: create_test_comment(1, 1, 2),
            author: "anna".to_string(),
        };

        let detail = service
            .update(existing.clone(), UpdateCommentInput::default(), true)
            .await
            .unwrap();
        assert_eq!(detail.comment, existing.comment);

        let result = service
            .update(existing, UpdateCommentInput::default(), false)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
