//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use yatube_common::Page;
use yatube_core::{CommentDetail, PostDetail, PostService};
use yatube_db::entities::group;

/// `201 Created` with a JSON body.
#[derive(Debug)]
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub const fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// A collection, either whole or as one page.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T: Serialize> {
    All(Vec<T>),
    Page(Page<T>),
}

/// Post as rendered to clients.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub pub_date: DateTimeWithTimeZone,
    pub image: Option<String>,
    pub group: Option<i64>,
}

impl PostResponse {
    /// Render a post, resolving its image to a public URL.
    #[must_use]
    pub fn new(detail: PostDetail, posts: &PostService) -> Self {
        let image = posts.image_url(&detail.post);
        let PostDetail { post, author } = detail;
        Self {
            id: post.id,
            author,
            text: post.text,
            pub_date: post.pub_date,
            image,
            group: post.group_id,
        }
    }
}

/// Comment as rendered to clients.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub author: String,
    pub post: i64,
    pub text: String,
    pub created: DateTimeWithTimeZone,
}

impl From<CommentDetail> for CommentResponse {
    fn from(detail: CommentDetail) -> Self {
        let CommentDetail { comment, author } = detail;
        Self {
            id: comment.id,
            author,
            post: comment.post_id,
            text: comment.text,
            created: comment.created,
        }
    }
}

/// Group as rendered to clients.
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<group::Model> for GroupResponse {
    fn from(group: group::Model) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}
