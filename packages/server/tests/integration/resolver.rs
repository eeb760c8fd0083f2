use banner_server::banners::{
    BannerCache, BannerPatch, BannerResolver, BannerStore, NewBanner, ReadMode, Session,
};
use banner_server::config::CacheConfig;
use sea_orm::DatabaseConnection;

use crate::common::{content, test_db};

/// Create a banner in its own committed session.
async fn seed(db: &DatabaseConnection, feature_id: i32, tag_ids: &[i32], title: &str) -> i32 {
    let mut session = Session::new(db.clone());
    let banner = BannerStore::new(session.tx().await.unwrap())
        .create(NewBanner {
            feature_id,
            tag_ids: tag_ids.to_vec(),
            content: content(title),
            is_active: true,
        })
        .await
        .unwrap();
    session.flush().await.unwrap();
    banner.id
}

fn cache() -> BannerCache {
    BannerCache::new(&CacheConfig::default())
}

mod read_modes {
    use super::*;

    #[tokio::test]
    async fn resolves_matching_content() {
        let db = test_db().await;
        seed(&db, 1, &[5, 7], "hello").await;
        let cache = cache();
        let resolver = BannerResolver::new(&cache);
        let mut session = Session::new(db.clone());

        let found = resolver
            .resolve(&mut session, 1, 7, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(found, Some(content("hello")));

        let missing = resolver
            .resolve(&mut session, 1, 6, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn absent_results_are_not_cached() {
        let db = test_db().await;
        let cache = cache();
        let resolver = BannerResolver::new(&cache);
        let mut session = Session::new(db.clone());

        let found = resolver
            .resolve(&mut session, 1, 5, ReadMode::Cached)
            .await
            .unwrap();
        assert!(found.is_none());
        assert!(cache.is_empty().await);

        seed(&db, 1, &[5], "late").await;
        let found = resolver
            .resolve(&mut session, 1, 5, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(found, Some(content("late")));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn fresh_read_observes_pending_write() {
        let db = test_db().await;
        let id = seed(&db, 1, &[5], "before").await;
        let cache = cache();
        let resolver = BannerResolver::new(&cache);
        let mut session = Session::new(db.clone());

        let warm = resolver
            .resolve(&mut session, 1, 5, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(warm, Some(content("before")));

        BannerStore::new(session.tx().await.unwrap())
            .update(
                id,
                BannerPatch {
                    content: Some(content("after")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(session.has_pending());

        let stale = resolver
            .resolve(&mut session, 1, 5, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(stale, Some(content("before")));

        let fresh = resolver
            .resolve(&mut session, 1, 5, ReadMode::Fresh)
            .await
            .unwrap();
        assert_eq!(fresh, Some(content("after")));
        assert!(!session.has_pending());

        let refreshed = resolver
            .resolve(&mut session, 1, 5, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(refreshed, Some(content("after")));
    }

    #[tokio::test]
    async fn cached_read_sees_own_pending_write_without_caching_it() {
        let db = test_db().await;
        let cache = cache();
        let resolver = BannerResolver::new(&cache);
        let mut session = Session::new(db.clone());

        BannerStore::new(session.tx().await.unwrap())
            .create(NewBanner {
                feature_id: 3,
                tag_ids: vec![1],
                content: content("draft"),
                is_active: true,
            })
            .await
            .unwrap();

        let found = resolver
            .resolve(&mut session, 3, 1, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(found, Some(content("draft")));
        assert!(cache.is_empty().await);

        session.rollback().await.unwrap();

        let gone = resolver
            .resolve(&mut session, 3, 1, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(gone, None);
    }

    #[tokio::test]
    async fn fresh_read_drops_deleted_banner_from_cache() {
        let db = test_db().await;
        let id = seed(&db, 1, &[5], "doomed").await;
        let cache = cache();
        let resolver = BannerResolver::new(&cache);
        let mut session = Session::new(db.clone());

        resolver
            .resolve(&mut session, 1, 5, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(cache.len().await, 1);

        BannerStore::new(session.tx().await.unwrap())
            .delete(id)
            .await
            .unwrap();

        let fresh = resolver
            .resolve(&mut session, 1, 5, ReadMode::Fresh)
            .await
            .unwrap();
        assert_eq!(fresh, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn expired_entries_are_reloaded() {
        let db = test_db().await;
        let id = seed(&db, 1, &[5], "v1").await;
        let cache = BannerCache::new(&CacheConfig {
            capacity: 8,
            ttl_secs: 0,
        });
        let resolver = BannerResolver::new(&cache);
        let mut session = Session::new(db.clone());

        resolver
            .resolve(&mut session, 1, 5, ReadMode::Cached)
            .await
            .unwrap();

        BannerStore::new(&db)
            .update(
                id,
                BannerPatch {
                    content: Some(content("v2")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let found = resolver
            .resolve(&mut session, 1, 5, ReadMode::Cached)
            .await
            .unwrap();
        assert_eq!(found, Some(content("v2")));
    }

    #[tokio::test]
    async fn lowest_id_wins_on_ambiguous_match() {
        let db = test_db().await;
        seed(&db, 1, &[5], "first").await;
        seed(&db, 1, &[5, 6], "second").await;
        let cache = cache();
        let mut session = Session::new(db.clone());

        let found = BannerResolver::new(&cache)
            .resolve(&mut session, 1, 5, ReadMode::Fresh)
            .await
            .unwrap();

        assert_eq!(found, Some(content("first")));
    }

    #[test]
    fn read_mode_follows_last_revision_flag() {
        assert_eq!(ReadMode::from_last_revision(true), ReadMode::Fresh);
        assert_eq!(ReadMode::from_last_revision(false), ReadMode::Cached);
        assert_eq!(ReadMode::default(), ReadMode::Cached);
    }
}
