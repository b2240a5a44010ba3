//! Follow repository.

use std::sync::Arc;

use crate::{
    db_error,
    entities::{Follow, follow, user},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
    sea_query::{Expr, Func, LikeExpr},
};
use yatube_common::AppResult;

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow edge by follower and target.
    pub async fn find_by_pair(
        &self,
        user_id: i64,
        following_id: i64,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, user_id: i64, following_id: i64) -> AppResult<bool> {
        Ok(self.find_by_pair(user_id, following_id).await?.is_some())
    }

    /// Create a new follow edge.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// List the edges where `user_id` is the follower.
    ///
    /// When `search` is set, only targets whose username contains it
    /// (case-insensitively) are kept.
    pub async fn find_by_user(
        &self,
        user_id: i64,
        search: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        let mut query = Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .order_by_asc(follow::Column::Id);

        if let Some(term) = search.filter(|s| !s.is_empty()) {
            query = query
                .join(JoinType::InnerJoin, follow::Relation::Following.def())
                .filter(
                    Expr::expr(Func::lower(Expr::col((
                        user::Entity,
                        user::Column::Username,
                    ))))
                    .like(contains_pattern(term)),
                );
        }

        query.all(self.db.as_ref()).await.map_err(db_error)
    }
}

/// Build a `LIKE` pattern matching `term` anywhere, lowercased, with
/// wildcards in the term escaped.
fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    fn create_test_follow(id: i64, user_id: i64, following_id: i64) -> follow::Model {
        follow::Model {
            id,
            user_id,
            following_id,
        }
    }

    #[tokio::test]
    async fn test_is_following() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_follow(1, 1, 2)]])
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);

        assert!(repo.is_following(1, 2).await.unwrap());
        assert!(!repo.is_following(2, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_user_without_search_skips_join() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_follow(1, 1, 2)]])
            .into_connection();
        let db = Arc::new(conn);

        let repo = FollowRepository::new(Arc::clone(&db));
        let edges = repo.find_by_user(1, None).await.unwrap();
        assert_eq!(edges.len(), 1);
        drop(repo);

        let conn = Arc::try_unwrap(db).unwrap();
        let log = conn.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(!format!("{:?}", log[0]).contains("JOIN"));
    }

    #[tokio::test]
    async fn test_find_by_user_with_search_filters_on_username() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_follow(1, 1, 2)]])
            .into_connection();
        let db = Arc::new(conn);

        let repo = FollowRepository::new(Arc::clone(&db));
        repo.find_by_user(1, Some("Bob")).await.unwrap();
        drop(repo);

        let conn = Arc::try_unwrap(db).unwrap();
        let log: Vec<Transaction> = conn.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("INNER JOIN"));
        assert!(sql.contains("LOWER"));
        assert!(sql.contains("%bob%"));
    }
}
