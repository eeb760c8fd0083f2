use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::{OnConflict, Query as SeaQuery, SelectStatement};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TryInsertResult,
};
use tracing::debug;

use crate::entity::banner_tag;

/// Subquery selecting the ids of every banner linked to `tag_id`.
pub(crate) fn banners_with_tag(tag_id: i32) -> SelectStatement {
    SeaQuery::select()
        .column(banner_tag::Column::BannerId)
        .from(banner_tag::Entity)
        .and_where(banner_tag::Column::TagId.eq(tag_id))
        .to_owned()
}

/// Maintains the `banner_tag` link rows.
pub struct AssociationManager<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AssociationManager<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Link `banner_id` to every tag in `tag_ids` that it is not linked to yet.
    ///
    /// Missing pairs are written with one batch insert. Returns the tag ids that
    /// this call actually linked, ascending. Existing links are left alone, and links
    /// outside `tag_ids` are not removed.
    ///
    /// A pair inserted by a concurrent caller between the lookup and the insert
    /// is skipped by the primary key and left out of the result.
    pub async fn ensure_associations(
        &self,
        banner_id: i32,
        tag_ids: &[i32],
    ) -> Result<Vec<i32>, DbErr> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let existing: HashSet<i32> = banner_tag::Entity::find()
            .filter(banner_tag::Column::BannerId.eq(banner_id))
            .filter(banner_tag::Column::TagId.is_in(tag_ids.iter().copied()))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();

        let mut seen = HashSet::new();
        let missing: Vec<i32> = tag_ids
            .iter()
            .copied()
            .filter(|tag_id| !existing.contains(tag_id) && seen.insert(*tag_id))
            .collect();

        if missing.is_empty() {
            return Ok(missing);
        }

        let rows = missing.iter().map(|&tag_id| banner_tag::ActiveModel {
            banner_id: Set(banner_id),
            tag_id: Set(tag_id),
        });

        let result = banner_tag::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([banner_tag::Column::BannerId, banner_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec_with_returning_many(self.conn)
            .await?;

        let mut linked: Vec<i32> = match result {
            TryInsertResult::Inserted(links) => links.into_iter().map(|link| link.tag_id).collect(),
            TryInsertResult::Conflicted | TryInsertResult::Empty => Vec::new(),
        };
        linked.sort_unstable();

        debug!(
            banner_id,
            linked = linked.len(),
            skipped = missing.len() - linked.len(),
            "Linked banner to tags"
        );

        Ok(linked)
    }

    /// Tag ids linked to one banner, ascending.
    pub async fn tag_ids_for(&self, banner_id: i32) -> Result<Vec<i32>, DbErr> {
        let links = banner_tag::Entity::find()
            .filter(banner_tag::Column::BannerId.eq(banner_id))
            .order_by_asc(banner_tag::Column::TagId)
            .all(self.conn)
            .await?;
        Ok(links.into_iter().map(|link| link.tag_id).collect())
    }

    /// Tag ids for several banners at once, keyed by banner id.
    ///
    /// Banners without links are absent from the map.
    pub async fn tag_ids_for_many(
        &self,
        banner_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<i32>>, DbErr> {
        if banner_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = banner_tag::Entity::find()
            .filter(banner_tag::Column::BannerId.is_in(banner_ids.iter().copied()))
            .order_by_asc(banner_tag::Column::BannerId)
            .order_by_asc(banner_tag::Column::TagId)
            .all(self.conn)
            .await?;

        let mut by_banner: HashMap<i32, Vec<i32>> = HashMap::new();
        for link in links {
            by_banner.entry(link.banner_id).or_default().push(link.tag_id);
        }
        Ok(by_banner)
    }

    /// Drop every link of `banner_id` whose tag is not in `tag_ids`.
    pub async fn retain_only(&self, banner_id: i32, tag_ids: &[i32]) -> Result<u64, DbErr> {
        let res = banner_tag::Entity::delete_many()
            .filter(banner_tag::Column::BannerId.eq(banner_id))
            .filter(banner_tag::Column::TagId.is_not_in(tag_ids.iter().copied()))
            .exec(self.conn)
            .await?;
        Ok(res.rows_affected)
    }

    /// Drop every link of `banner_id`.
    pub async fn remove_all(&self, banner_id: i32) -> Result<u64, DbErr> {
        let res = banner_tag::Entity::delete_many()
            .filter(banner_tag::Column::BannerId.eq(banner_id))
            .exec(self.conn)
            .await?;
        Ok(res.rows_affected)
    }
}
