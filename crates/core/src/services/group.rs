//! Group service.

use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde::Deserialize;
use validator::{Validate, ValidationError};
use yatube_common::{AppError, AppResult};
use yatube_db::{entities::group, repositories::GroupRepository};

/// Maximum slug length.
const MAX_SLUG_LENGTH: usize = 50;

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Derived from the title when omitted.
    #[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
    pub slug: Option<String>,

    #[serde(default)]
    pub description: String,
}

/// Input for updating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
    pub slug: Option<String>,

    pub description: Option<String>,
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("slug").with_message(
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.".into(),
        ))
    }
}

/// Turn a title into a slug: lowercase ASCII words joined by hyphens.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches(['-', '_']).to_string()
}

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self { group_repo }
    }

    /// List all groups.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// Get a group by ID.
    pub async fn get(&self, id: i64) -> AppResult<group::Model> {
        self.group_repo.get_by_id(id).await
    }

    /// Create a new group.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        let slug = match input.slug {
            Some(slug) => slug,
            None => slugify(&input.title),
        };
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Cannot derive a slug from this title; provide one explicitly.".to_string(),
            ));
        }
        self.ensure_slug_free(&slug, None).await?;

        let model = group::ActiveModel {
            title: Set(input.title),
            slug: Set(slug),
            description: Set(input.description),
            ..Default::default()
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(group_id = group.id, group = %group, "Created group");

        Ok(group)
    }

    /// Update a group.
    pub async fn update(&self, id: i64, input: UpdateGroupInput) -> AppResult<group::Model> {
        let group = self.group_repo.get_by_id(id).await?;
        input.validate()?;

        if let Some(slug) = &input.slug {
            self.ensure_slug_free(slug, Some(id)).await?;
        }

        let mut model = group.into_active_model();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(slug) = input.slug {
            model.slug = Set(slug);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }

        if !model.is_changed() {
            return self.group_repo.get_by_id(id).await;
        }

        self.group_repo.update(model).await
    }

    /// Delete a group. Its posts stay, detached from any group.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let group = self.group_repo.get_by_id(id).await?;
        self.group_repo.delete(group.id).await?;
        tracing::info!(group_id = group.id, group = %group, "Deleted group");
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &str, current: Option<i64>) -> AppResult<()> {
        match self.group_repo.find_by_slug(slug).await? {
            Some(other) if Some(other.id) != current => Err(AppError::Validation(
                "group with this slug already exists.".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_group(id: i64, title: &str, slug: &str) -> group::Model {
        group::Model {
            id,
            title: title.to_string(),
            slug: slug.to_string(),
            description: String::new(),
        }
    }

    fn create_test_service(db: DatabaseConnection) -> GroupService {
        GroupService::new(GroupRepository::new(Arc::new(db)))
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Cats and Dogs"), "cats-and-dogs");
        assert_eq!(slugify("  Rust -- 2024! "), "rust-2024");
        assert_eq!(slugify("snake_case title"), "snake_case-title");
        assert_eq!(slugify("Кошки"), "");
        assert!(slugify(&"word ".repeat(20)).len() <= MAX_SLUG_LENGTH);
    }

    #[test]
    fn test_slug_validation() {
        let input = CreateGroupInput {
            title: "Cats".to_string(),
            slug: Some("not a slug".to_string()),
            description: String::new(),
        };
        assert!(input.validate().is_err());

        let input = CreateGroupInput {
            title: "x".repeat(201),
            slug: None,
            description: String::new(),
        };
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group::Model>::new()])
            .append_query_results([[create_test_group(1, "Cats and Dogs", "cats-and-dogs")]])
            .into_connection();

        let service = create_test_service(db);
        let group = service
            .create(CreateGroupInput {
                title: "Cats and Dogs".to_string(),
                slug: None,
                description: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(group.slug, "cats-and-dogs");
    }

    #[tokio::test]
    async fn test_create_duplicate_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_group(1, "Cats", "cats")]])
            .into_connection();

        let service = create_test_service(db);
        let result = service
            .create(CreateGroupInput {
                title: "Cats again".to_string(),
                slug: Some("cats".to_string()),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_own_slug() {
        let current = create_test_group(1, "Cats", "cats");
        let mut renamed = current.clone();
        renamed.title = "Cats!".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[current.clone()]])
            .append_query_results([[current]])
            .append_query_results([[renamed]])
            .into_connection();

        let service = create_test_service(db);
        let group = service
            .update(
                1,
                UpdateGroupInput {
                    title: Some("Cats!".to_string()),
                    slug: Some("cats".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(group.title, "Cats!");
    }

    #[tokio::test]
    async fn test_delete_unknown_group() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group::Model>::new()])
            .into_connection();

        let service = create_test_service(db);
        assert!(matches!(
            service.delete(9).await,
            Err(AppError::NotFound(_))
        ));
    }
}
