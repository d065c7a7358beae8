use crate::entities::{files, sessions, users};
use anyhow::Context;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema, Statement};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt)
        .await
        .with_context(|| format!("Failed to connect to {}", db_url))?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

/// Creates the tables from the entity definitions if they are missing.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("🔄 Running SeaORM auto-migrations...");
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let stmts = vec![
        schema
            .create_table_from_entity(users::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(files::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(sessions::Entity)
            .if_not_exists()
            .to_owned(),
    ];

    for stmt in stmts {
        db.execute(builder.build(&stmt))
            .await
            .context("Failed to create table")?;
    }

    // Listing filters on (user_id, category) and sorts by upload_date
    db.execute(Statement::from_string(
        builder,
        "CREATE INDEX IF NOT EXISTS idx_files_owner_category ON files(user_id, category, upload_date);"
            .to_string(),
    ))
    .await
    .context("Failed to create files index")?;

    Ok(())
}
