use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    /// Supplied by the client, never generated.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    #[sea_orm(has_many, via = "banner_tag")]
    pub banners: HasMany<super::banner::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
