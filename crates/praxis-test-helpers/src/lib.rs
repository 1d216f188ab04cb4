pub mod seed;

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Fresh in-memory database with the full schema applied.
pub async fn memory_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    praxis_db::migration::migrate(&db).await?;
    Ok(db)
}
