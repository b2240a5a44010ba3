//! Follow service.

use std::{collections::HashMap, fmt};

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yatube_common::{AppError, AppResult};
use yatube_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};

/// A follow edge rendered with usernames on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowDetail {
    pub user: String,
    pub following: String,
}

impl fmt::Display for FollowDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} follows {}", self.user, self.following)
    }
}

/// Input for following a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFollowInput {
    /// Username of the user to follow.
    #[validate(length(min = 1, max = 150))]
    pub following: String,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
        }
    }

    /// List who `follower` follows, optionally narrowed by a username fragment.
    pub async fn list(
        &self,
        follower: &user::Model,
        search: Option<&str>,
    ) -> AppResult<Vec<FollowDetail>> {
        let edges = self.follow_repo.find_by_user(follower.id, search).await?;

        let target_ids: Vec<i64> = edges.iter().map(|e| e.following_id).collect();
        let usernames: HashMap<i64, String> = self
            .user_repo
            .find_by_ids(&target_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        edges
            .into_iter()
            .map(|edge| {
                let following = usernames.get(&edge.following_id).cloned().ok_or_else(|| {
                    AppError::Internal(format!("Followed user {} missing", edge.following_id))
                })?;
                Ok(FollowDetail {
                    user: follower.username.clone(),
                    following,
                })
            })
            .collect()
    }

    /// Make `follower` follow the user named in `input`.
    pub async fn create(
        &self,
        follower: &user::Model,
        input: CreateFollowInput,
    ) -> AppResult<FollowDetail> {
        input.validate()?;

        let target = self
            .user_repo
            .find_by_username(&input.following)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "following: Object with username={} does not exist.",
                    input.following
                ))
            })?;

        if target.id == follower.id {
            return Err(AppError::Validation(
                "You cannot follow yourself.".to_string(),
            ));
        }

        if self.follow_repo.is_following(follower.id, target.id).await? {
            return Err(AppError::Validation(
                "You are already following this user.".to_string(),
            ));
        }

        let model = follow::ActiveModel {
            user_id: Set(follower.id),
            following_id: Set(target.id),
            ..Default::default()
        };
        self.follow_repo.create(model).await?;

        let detail = FollowDetail {
            user: follower.username.clone(),
            following: target.username,
        };
        tracing::info!(
            user_id = follower.id,
            following_id = target.id,
            edge = %detail,
            "Created follow"
        );

        Ok(detail)
    }
}
