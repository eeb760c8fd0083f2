use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{banner, banner_tag, tag, user};

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Create any missing tables for the banner entities.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_builder()
        .register(tag::Entity)
        .register(banner::Entity)
        .register(banner_tag::Entity)
        .register(user::Entity)
        .sync(db)
        .await
}

/// Ensure secondary indexes that schema-sync does not derive from the entities.
///
/// The `banner_tag` primary key starts with `banner_id`, so lookups by tag
/// (listing by tag, user banner resolution) need their own index.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_banner_tag_tag_id")
        .table(banner_tag::Entity)
        .col(banner_tag::Column::TagId)
        .to_owned();

    let backend = db.get_database_backend();
    match db.execute_raw(backend.build(&stmt)).await {
        Ok(_) => {
            info!("Ensured index idx_banner_tag_tag_id exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_banner_tag_tag_id: {}", e);
        }
    }

    Ok(())
}
