

use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use migration::MigratorTrait;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Database tests run only when `DATABASE_URL` points at a PostgreSQL
/// instance and `SKIP_DB_TESTS` is unset.
pub(crate) fn db_tests_enabled() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("SKIP_DB_TESTS").is_err() && std::env::var("DATABASE_URL").is_ok()
}

/// Migrated connection to the shared test database, or `None` when DB tests
/// are disabled.
pub(crate) async fn setup_test_db() -> anyhow::Result<Option<DatabaseConnection>> {
    if !db_tests_enabled() {
        return Ok(None);
    }
    let db = crate::db::connect().await?;
    MIGRATED
        .get_or_try_init(|| async { migration::Migrator::up(&db, None).await })
        .await?;
    Ok(Some(db))
}
