//! User repository.

use std::sync::Arc;

use crate::{
    db_error,
    entities::{User, user},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use yatube_common::{AppError, AppResult};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id}")))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a user. Posts, comments and follow edges go with it.
    pub async fn delete(&self, id: i64) -> AppResult<u64> {
        User::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(db_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: i64, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            password: "$argon2id$hash".to_string(),
            is_staff: false,
            date_joined: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_username_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user(1, "leo")]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let found = repo.find_by_username("leo").await.unwrap().unwrap();

        assert_eq!(found.id, 1);
        assert_eq!(found.username, "leo");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id(42).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        // No results appended: a query would fail.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let users = repo.find_by_ids(&[]).await.unwrap();

        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        assert_eq!(repo.delete(1).await.unwrap(), 1);
    }
}
