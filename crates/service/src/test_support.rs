use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use migration::MigratorTrait;
use models::db::{connect_options, DatabaseConfig};

use crate::auth::domain::AuthUser;

// migrations run once per test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    let mut cfg = DatabaseConfig { url: models::db::DATABASE_URL.clone(), ..Default::default() };
    cfg.max_connections = 5;
    cfg.min_connections = 1;
    cfg.acquire_timeout_secs = 10;
    cfg
}

/// Migrated connection, or `None` when `DATABASE_URL` is unset or
/// `SKIP_DB_TESTS` is set.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    let _ = dotenvy::dotenv();
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    let db = sea_orm::Database::connect(connect_options(&test_config())).await?;
    MIGRATED
        .get_or_try_init(|| async { migration::Migrator::up(&db, None).await })
        .await?;
    Ok(Some(db))
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4())
}

pub async fn create_user(db: &DatabaseConnection, is_admin: bool) -> Result<AuthUser, anyhow::Error> {
    let user = models::user::create(db, &unique("svc_user"), is_admin).await?;
    Ok(user.into())
}
