//! Comment repository.

use std::sync::Arc;

use crate::{
    db_error,
    entities::{Comment, comment},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use yatube_common::{AppError, AppResult};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List the comments of a post, oldest first.
    pub async fn find_by_post(&self, post_id: i64) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Created)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a comment that belongs to the given post.
    pub async fn find_in_post(&self, post_id: i64, id: i64) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a comment in a post, returning an error if not found.
    pub async fn get_in_post(&self, post_id: i64, id: i64) -> AppResult<comment::Model> {
        self.find_in_post(post_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {id}")))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a comment.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
