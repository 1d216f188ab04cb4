use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr};

/// Applies the embedded schema. Statements are `IF NOT EXISTS`, so running
/// this on every startup is safe.
pub async fn migrate<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let schema = match db.get_database_backend() {
        DatabaseBackend::Postgres => include_str!("migration/postgres.sql"),
        DatabaseBackend::Sqlite => include_str!("migration/sqlite.sql"),
        backend => return Err(DbErr::Custom(format!("unsupported backend {backend:?}"))),
    };
    db.execute_unprepared(schema).await.inspect_err(|error| {
        tracing::error!(error = error as &dyn std::error::Error, "failed to apply schema");
    })?;
    Ok(())
}
