//! Post repository.

use std::sync::Arc;

use crate::{
    db_error,
    entities::{Post, post},
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
};
use yatube_common::{AppError, AppResult};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {id}")))
    }

    /// List posts newest first.
    ///
    /// `window` is an optional `(limit, offset)` pair; without it every post
    /// is returned.
    pub async fn find_recent(&self, window: Option<(u64, u64)>) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id);

        if let Some((limit, offset)) = window {
            query = query.limit(limit).offset(offset);
        }

        query.all(self.db.as_ref()).await.map_err(db_error)
    }

    /// Count all posts.
    pub async fn count(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a post and, through the foreign key, its comments.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn create_test_post(id: i64, author_id: i64, text: &str) -> post::Model {
        post::Model {
            id,
            text: text.to_string(),
            pub_date: Utc::now().into(),
            author_id,
            image: None,
            group_id: None,
        }
    }

    #[tokio::test]
    async fn test_find_recent_returns_rows_in_query_order() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_post(2, 1, "second"),
                    create_test_post(1, 1, "first"),
                ]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let posts = repo.find_recent(Some((2, 0))).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, 2);
        assert_eq!(posts[1].id, 1);
    }

    #[tokio::test]
    async fn test_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[BTreeMap::from([(
                    "num_items",
                    sea_orm::Value::BigInt(Some(5)),
                )])]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        assert_eq!(repo.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id(99).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
