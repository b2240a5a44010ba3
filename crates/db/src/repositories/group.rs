//! Group repository.

use std::sync::Arc;

use crate::{
    db_error,
    entities::{Group, group},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use yatube_common::{AppError, AppResult};

/// Group repository for database operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a group by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<group::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {id}")))
    }

    /// Find a group by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<group::Model>> {
        Group::find()
            .filter(group::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// List all groups.
    pub async fn find_all(&self) -> AppResult<Vec<group::Model>> {
        Group::find()
            .order_by_asc(group::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a new group.
    pub async fn create(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a group.
    pub async fn update(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a group. Posts in it keep existing without a group.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        Group::delete_by_id(id)
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
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_group(id: i64, slug: &str) -> group::Model {
        group::Model {
            id,
            title: format!("Group {slug}"),
            slug: slug.to_string(),
            description: "A test group".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_group(1, "cats"), create_test_group(2, "dogs")]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let groups = repo.find_all().await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].slug, "cats");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.get_by_id(7).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_group(3, "books")]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let group = repo.find_by_slug("books").await.unwrap();

        assert_eq!(group.map(|g| g.id), Some(3));
    }
}
