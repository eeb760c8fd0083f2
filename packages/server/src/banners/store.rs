use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use tracing::debug;

use super::associations::{AssociationManager, banners_with_tag};
use super::tags::TagRegistry;
use crate::entity::banner;

/// A banner together with its tag set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub id: i32,
    pub feature_id: i32,
    /// Ascending, without duplicates.
    pub tag_ids: Vec<i32>,
    pub content: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Banner {
    fn from_model(m: banner::Model, tag_ids: Vec<i32>) -> Self {
        Self {
            id: m.id,
            feature_id: m.feature_id,
            tag_ids,
            content: m.content,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewBanner {
    pub feature_id: i32,
    pub tag_ids: Vec<i32>,
    pub content: serde_json::Value,
    pub is_active: bool,
}

/// Sparse update. `None` leaves a field untouched.
///
/// A non-empty `tag_ids` replaces the whole tag set; an empty list is ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BannerPatch {
    pub feature_id: Option<i32>,
    pub tag_ids: Option<Vec<i32>>,
    pub content: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

/// Optional predicates and paging for [`BannerStore::list`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BannerFilter {
    pub feature_id: Option<i32>,
    pub tag_id: Option<i32>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub struct BannerStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> BannerStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn tags(&self) -> TagRegistry<'a, C> {
        TagRegistry::new(self.conn)
    }

    fn links(&self) -> AssociationManager<'a, C> {
        AssociationManager::new(self.conn)
    }

    /// Insert a banner, registering its tags on the way.
    pub async fn create(&self, new: NewBanner) -> Result<Banner, DbErr> {
        let tags = self.tags().ensure_tags(&new.tag_ids).await?;
        let mut tag_ids: Vec<i32> = tags.into_iter().map(|t| t.id).collect();

        let now = Utc::now();
        let model = banner::ActiveModel {
            feature_id: Set(new.feature_id),
            content: Set(new.content),
            is_active: Set(new.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        self.links().ensure_associations(model.id, &tag_ids).await?;
        tag_ids.sort_unstable();

        debug!(banner_id = model.id, feature_id = model.feature_id, "Created banner");
        Ok(Banner::from_model(model, tag_ids))
    }

    /// Apply a sparse update.
    ///
    /// Returns `false` if the banner does not exist. Otherwise the row is
    /// written and `updated_at` moves forward, even when `patch` is empty.
    pub async fn update(&self, banner_id: i32, patch: BannerPatch) -> Result<bool, DbErr> {
        let Some(existing) = banner::Entity::find_by_id(banner_id).one(self.conn).await? else {
            return Ok(false);
        };

        if let Some(tag_ids) = patch.tag_ids.filter(|ids| !ids.is_empty()) {
            let tags = self.tags().ensure_tags(&tag_ids).await?;
            let tag_ids: Vec<i32> = tags.into_iter().map(|t| t.id).collect();
            let links = self.links();
            let removed = links.retain_only(banner_id, &tag_ids).await?;
            let added = links.ensure_associations(banner_id, &tag_ids).await?;
            debug!(banner_id, removed, added = added.len(), "Replaced banner tags");
        }

        let mut active: banner::ActiveModel = existing.into();
        if let Some(feature_id) = patch.feature_id {
            active.feature_id = Set(feature_id);
        }
        if let Some(content) = patch.content {
            active.content = Set(content);
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());
        active.update(self.conn).await?;

        Ok(true)
    }

    /// Remove a banner and its tag links. Returns the number of banners removed.
    pub async fn delete(&self, banner_id: i32) -> Result<u64, DbErr> {
        let unlinked = self.links().remove_all(banner_id).await?;
        let res = banner::Entity::delete_by_id(banner_id)
            .exec(self.conn)
            .await?;
        if res.rows_affected > 0 {
            debug!(banner_id, unlinked, "Deleted banner");
        }
        Ok(res.rows_affected)
    }

    pub async fn get_by_id(&self, banner_id: i32) -> Result<Option<Banner>, DbErr> {
        let Some(model) = banner::Entity::find_by_id(banner_id).one(self.conn).await? else {
            return Ok(None);
        };
        let tag_ids = self.links().tag_ids_for(banner_id).await?;
        Ok(Some(Banner::from_model(model, tag_ids)))
    }

    /// List banners matching every predicate set in `filter`, by ascending id.
    pub async fn list(&self, filter: BannerFilter) -> Result<Vec<Banner>, DbErr> {
        let mut select = banner::Entity::find();

        if let Some(feature_id) = filter.feature_id {
            select = select.filter(banner::Column::FeatureId.eq(feature_id));
        }
        if let Some(tag_id) = filter.tag_id {
            select = select.filter(banner::Column::Id.in_subquery(banners_with_tag(tag_id)));
        }

        // SQLite rejects OFFSET without LIMIT, so an offset alone gets an unbounded limit.
        let limit = filter
            .limit
            .or_else(|| filter.offset.map(|_| i64::MAX as u64));

        let models = select
            .order_by_asc(banner::Column::Id)
            .offset(filter.offset)
            .limit(limit)
            .all(self.conn)
            .await?;

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut tag_map = self.links().tag_ids_for_many(&ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let tag_ids = tag_map.remove(&m.id).unwrap_or_default();
                Banner::from_model(m, tag_ids)
            })
            .collect())
    }
}
