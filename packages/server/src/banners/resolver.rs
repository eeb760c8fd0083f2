use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tokio::sync::Mutex;
use tracing::debug;

use super::associations::banners_with_tag;
use super::session::Session;
use crate::config::CacheConfig;
use crate::entity::banner;

/// How much staleness a user banner read tolerates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Serve from the cache when possible; otherwise read without flushing
    /// pending writes. May miss the caller's latest mutation.
    #[default]
    Cached,
    /// Flush pending writes and read from the database, refreshing the cache.
    Fresh,
}

impl ReadMode {
    pub fn from_last_revision(use_last_revision: bool) -> Self {
        if use_last_revision {
            Self::Fresh
        } else {
            Self::Cached
        }
    }
}

type CacheKey = (i32, i32);

struct CachedContent {
    content: serde_json::Value,
    stored_at: Instant,
}

/// Bounded, time-limited cache of resolved banner content keyed by (feature, tag).
///
/// Only hits are stored, so a newly created banner becomes visible on the next
/// read. Updates and deletions show up once the entry expires or a fresh read
/// replaces it.
pub struct BannerCache {
    entries: Mutex<LruCache<CacheKey, CachedContent>>,
    ttl: Duration,
}

impl BannerCache {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }

    async fn get(&self, key: CacheKey) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.content.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(&key);
        }
        None
    }

    async fn put(&self, key: CacheKey, content: serde_json::Value) {
        self.entries.lock().await.put(
            key,
            CachedContent {
                content,
                stored_at: Instant::now(),
            },
        );
    }

    async fn remove(&self, key: CacheKey) {
        self.entries.lock().await.pop(&key);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Maps a (feature, tag) pair to the content of one banner.
///
/// Nothing stops two banners from sharing a feature and a tag. When that
/// happens the one with the lowest id wins; treat the result as best-effort
/// rather than unique.
pub struct BannerResolver<'a> {
    cache: &'a BannerCache,
}

impl<'a> BannerResolver<'a> {
    pub fn new(cache: &'a BannerCache) -> Self {
        Self { cache }
    }

    /// Content of the banner for `(feature_id, tag_id)`, or `None` if no banner matches.
    pub async fn resolve(
        &self,
        session: &mut Session,
        feature_id: i32,
        tag_id: i32,
        mode: ReadMode,
    ) -> Result<Option<serde_json::Value>, DbErr> {
        let key = (feature_id, tag_id);

        match mode {
            ReadMode::Cached => {
                if let Some(content) = self.cache.get(key).await {
                    debug!(feature_id, tag_id, "User banner cache hit");
                    return Ok(Some(content));
                }
                debug!(feature_id, tag_id, "User banner cache miss");

                // Uncommitted rows may still be rolled back, so they never reach the cache.
                if let Some(txn) = session.pending() {
                    return find_content(txn, feature_id, tag_id).await;
                }

                let found = find_content(session.connection(), feature_id, tag_id).await?;
                if let Some(content) = &found {
                    self.cache.put(key, content.clone()).await;
                }
                Ok(found)
            }
            ReadMode::Fresh => {
                if session.flush().await? {
                    debug!(feature_id, tag_id, "Flushed pending writes before fresh read");
                }

                let found = find_content(session.connection(), feature_id, tag_id).await?;
                match &found {
                    Some(content) => self.cache.put(key, content.clone()).await,
                    None => self.cache.remove(key).await,
                }
                Ok(found)
            }
        }
    }
}

async fn find_content<C: ConnectionTrait>(
    conn: &C,
    feature_id: i32,
    tag_id: i32,
) -> Result<Option<serde_json::Value>, DbErr> {
    let found = banner::Entity::find()
        .filter(banner::Column::FeatureId.eq(feature_id))
        .filter(banner::Column::Id.in_subquery(banners_with_tag(tag_id)))
        .order_by_asc(banner::Column::Id)
        .one(conn)
        .await?;
    Ok(found.map(|m| m.content))
}
