use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

/// Connect to the relational store and bring the schema up to date
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection, std::io::Error> {
    let db = Database::connect(database_url).await.map_err(|e| {
        std::io::Error::other(format!("Failed to connect to database: {}", e))
    })?;

    tracing::info!("Connected to database");

    Migrator::up(&db, None)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Database migrations completed");

    Ok(db)
}
