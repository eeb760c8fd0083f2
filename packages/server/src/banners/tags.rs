use std::collections::HashSet;

use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use tracing::debug;

use crate::entity::tag;

/// Get-or-create access to the `tag` table.
pub struct TagRegistry<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TagRegistry<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Make sure a tag with this id exists.
    ///
    /// Returns the stored row and whether this call created it. There is no
    /// lookup before the insert: a tag that already exists, including one a
    /// concurrent caller just wrote, turns the insert into a no-op and is read back.
    pub async fn ensure_tag(&self, tag_id: i32) -> Result<(tag::Model, bool), DbErr> {
        let result = tag::Entity::insert(tag::ActiveModel { id: Set(tag_id) })
            .on_conflict(OnConflict::column(tag::Column::Id).do_nothing().to_owned())
            .exec_without_returning(self.conn)
            .await;

        let created = match result {
            Ok(rows) => rows > 0,
            Err(DbErr::RecordNotInserted) => false,
            Err(e) => return Err(e),
        };

        let tag = tag::Entity::find_by_id(tag_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("tag {tag_id} missing after insert")))?;

        if created {
            debug!(tag_id, "Registered new tag");
        }

        Ok((tag, created))
    }

    /// Resolve a list of tag ids, creating the missing ones.
    ///
    /// Duplicates in the input are ignored; the output keeps first-seen order.
    pub async fn ensure_tags(&self, tag_ids: &[i32]) -> Result<Vec<tag::Model>, DbErr> {
        let mut seen = HashSet::new();
        let mut tags = Vec::with_capacity(tag_ids.len());
        for &tag_id in tag_ids {
            if !seen.insert(tag_id) {
                continue;
            }
            let (tag, _) = self.ensure_tag(tag_id).await?;
            tags.push(tag);
        }
        Ok(tags)
    }
}
