use crate::entities::{media_objects, media_objects2media_tags, media_tags};
use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm::{ConnectionTrait, Schema};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Link table last: it references both others
    let stmts = vec![
        (
            "media_objects",
            schema
                .create_table_from_entity(media_objects::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "media_tags",
            schema
                .create_table_from_entity(media_tags::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "media_objects2media_tags",
            schema
                .create_table_from_entity(media_objects2media_tags::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt)
            .await
            .with_context(|| format!("Failed to create table '{}'", name))?;
        info!("   - Table '{}' checked/created", name);
    }

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_media_objects_project ON media_objects(project)",
        "CREATE INDEX IF NOT EXISTS idx_media_objects_file_mime_type ON media_objects(file_mime_type)",
        "CREATE INDEX IF NOT EXISTS idx_media_objects_date_added ON media_objects(date_added)",
        "CREATE INDEX IF NOT EXISTS idx_media_tags_project_word ON media_tags(project, word)",
    ];

    for query in indexes {
        match db
            .execute(sea_orm::Statement::from_string(builder, query.to_owned()))
            .await
        {
            Ok(_) => tracing::debug!("   - Executed: {}", query),
            Err(e) => tracing::warn!("   - Index creation warning: {} -> {}", query, e),
        }
    }

    Ok(())
}
