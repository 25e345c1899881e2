use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Config;

pub type Database = PgPool;

pub async fn create_database_connection(config: &Config) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!(max_connections = config.max_connections, "database connected");
    Ok(pool)
}

pub async fn run_migrations(pool: &Database) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("migrations applied");
    Ok(())
}
