//! Follow entity (directed follow edges between users).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `user_id` follows `following_id`. The pair is unique and the two ids
/// never match; both rules are enforced by table constraints.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follow")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The user who is following
    #[sea_orm(indexed)]
    pub user_id: i64,

    /// The user being followed
    #[sea_orm(indexed)]
    pub following_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowingId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Following,
}

impl ActiveModelBehavior for ActiveModel {}
