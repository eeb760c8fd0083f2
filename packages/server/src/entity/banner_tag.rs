use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Link row between a banner and one of its tags.
///
/// The composite primary key is the storage-level guarantee that a pair exists at most once.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "banner_tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub banner_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i32,
    #[sea_orm(belongs_to, from = "banner_id", to = "id")]
    pub banner: Option<super::banner::Entity>,
    #[sea_orm(belongs_to, from = "tag_id", to = "id")]
    pub tag: Option<super::tag::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
