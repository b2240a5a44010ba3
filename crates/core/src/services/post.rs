//! Post service.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use validator::Validate;
use yatube_common::{
    AppError, AppResult, PageRequest, StorageBackend, decode_image_data_uri, post_image_key,
};
use yatube_db::{
    entities::{post, user},
    repositories::{GroupRepository, PostRepository, UserRepository},
};

use super::validate_not_blank;

/// A post together with its author's username.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: post::Model,
    pub author: String,
}

/// Input for creating a post.
///
/// `author` and `pub_date` are never read from the client.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,

    /// Base64 data URI.
    pub image: Option<String>,

    pub group: Option<i64>,
}

/// Input for replacing (`partial = false`) or patching a post.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: Option<String>,

    /// `null` clears the image.
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub image: Option<Option<String>>,

    /// `null` detaches the post from its group.
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub group: Option<Option<i64>>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    user_repo: UserRepository,
    storage: Arc<dyn StorageBackend>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        user_repo: UserRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            user_repo,
            storage,
        }
    }

    /// List posts newest first, with the total count.
    pub async fn list(&self, window: Option<PageRequest>) -> AppResult<(Vec<PostDetail>, u64)> {
        let posts = self
            .post_repo
            .find_recent(window.map(|w| (w.limit, w.offset)))
            .await?;

        let count = match window {
            Some(_) => self.post_repo.count().await?,
            None => posts.len() as u64,
        };

        Ok((self.attach_authors(posts).await?, count))
    }

    /// Get a post by ID.
    pub async fn get(&self, id: i64) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(id).await?;
        let author = self.user_repo.get_by_id(post.author_id).await?;

        Ok(PostDetail {
            post,
            author: author.username,
        })
    }

    /// Create a post authored by `author`.
    pub async fn create(&self, author: &user::Model, input: CreatePostInput) -> AppResult<PostDetail> {
        input.validate()?;

        if let Some(group_id) = input.group {
            self.ensure_group(group_id).await?;
        }

        let image = match input.image.as_deref() {
            Some(data) if !data.is_empty() => Some(self.store_image(data).await?),
            _ => None,
        };

        let model = post::ActiveModel {
            text: Set(input.text),
            pub_date: Set(Utc::now().into()),
            author_id: Set(author.id),
            image: Set(image.clone()),
            group_id: Set(input.group),
            ..Default::default()
        };

        let post = match self.post_repo.create(model).await {
            Ok(post) => post,
            Err(e) => {
                if let Some(key) = image {
                    self.discard_image(&key).await;
                }
                return Err(e);
            }
        };

        tracing::info!(post_id = post.id, author_id = author.id, post = %post, "Created post");

        Ok(PostDetail {
            post,
            author: author.username.clone(),
        })
    }

    /// Update a post.
    ///
    /// A full update (`partial = false`) requires `text`; fields left out
    /// keep their current values either way.
    pub async fn update(
        &self,
        existing: PostDetail,
        input: UpdatePostInput,
        partial: bool,
    ) -> AppResult<PostDetail> {
        if !partial && input.text.is_none() {
            return Err(AppError::Validation("text: This field is required.".to_string()));
        }
        input.validate()?;

        if let Some(Some(group_id)) = input.group {
            self.ensure_group(group_id).await?;
        }

        let old_image = existing.post.image.clone();
        let new_image = match input.image {
            Some(Some(data)) if !data.is_empty() => Some(Some(self.store_image(&data).await?)),
            Some(_) => Some(None),
            None => None,
        };

        let mut model = existing.post.into_active_model();
        if let Some(text) = input.text {
            model.text = Set(text);
        }
        if let Some(group) = input.group {
            model.group_id = Set(group);
        }
        if let Some(image) = new_image.clone() {
            model.image = Set(image);
        }

        let post = match self.post_repo.update(model).await {
            Ok(post) => post,
            Err(e) => {
                if let Some(Some(key)) = new_image {
                    self.discard_image(&key).await;
                }
                return Err(e);
            }
        };

        if let (Some(_), Some(key)) = (&new_image, old_image) {
            self.discard_image(&key).await;
        }

        tracing::info!(post_id = post.id, post = %post, "Updated post");

        Ok(PostDetail {
            post,
            author: existing.author,
        })
    }

    /// Delete a post together with its comments and image.
    pub async fn delete(&self, existing: PostDetail) -> AppResult<()> {
        self.post_repo.delete(existing.post.id).await?;

        if let Some(key) = existing.post.image {
            self.discard_image(&key).await;
        }

        tracing::info!(post_id = existing.post.id, "Deleted post");
        Ok(())
    }

    /// Public URL of a post's image.
    #[must_use]
    pub fn image_url(&self, post: &post::Model) -> Option<String> {
        post.image.as_deref().map(|key| self.storage.public_url(key))
    }

    async fn ensure_group(&self, group_id: i64) -> AppResult<()> {
        if self.group_repo.find_by_id(group_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "group: Invalid pk \"{group_id}\" - object does not exist."
            )));
        }
        Ok(())
    }

    async fn store_image(&self, data: &str) -> AppResult<String> {
        let decoded = decode_image_data_uri(data)?;
        let stored = self
            .storage
            .save(&post_image_key(decoded.extension), &decoded.data)
            .await?;
        tracing::debug!(key = %stored.key, size = stored.size, "Stored post image");
        Ok(stored.key)
    }

    /// Remove a stored image; a failure only leaves an orphaned file behind.
    async fn discard_image(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete post image");
        }
    }

    async fn attach_authors(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostDetail>> {
        let mut author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let usernames: HashMap<i64, String> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        posts
            .into_iter()
            .map(|post| {
                let author = usernames.get(&post.author_id).cloned().ok_or_else(|| {
                    AppError::Internal(format!("Author {} of post {} missing", post.author_id, post.id))
                })?;
                Ok(PostDetail { post, author })
            })
            .collect()
    }
}
