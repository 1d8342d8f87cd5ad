use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{info, warn};
use std::path::Path;
use std::time::Duration;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

/// Enables WAL mode and sets pragmas so concurrent request handlers don't
/// trip over SQLite's default locking behavior.
#[derive(Debug)]
pub struct SqliteConnectionCustomizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        use diesel::sql_query;

        sql_query("PRAGMA busy_timeout = 60000")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        sql_query("PRAGMA foreign_keys = ON")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        if let Err(e) = sql_query("PRAGMA journal_mode = WAL").execute(conn) {
            warn!("Failed to enable WAL mode: {e}");
        }

        // Non-critical performance pragmas
        for pragma in [
            "PRAGMA synchronous = NORMAL",
            "PRAGMA cache_size = -32000",
            "PRAGMA temp_store = MEMORY",
        ] {
            if let Err(e) = sql_query(pragma).execute(conn) {
                warn!("Failed to apply {pragma}: {e}");
            }
        }

        Ok(())
    }
}

/// Creates a new database connection pool and runs pending migrations.
pub fn create_pool(database_url: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    if let Some(parent) = Path::new(database_url).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(16)
        .min_idle(Some(2))
        .connection_timeout(Duration::from_secs(60))
        .idle_timeout(Some(Duration::from_secs(300)))
        .connection_customizer(Box::new(SqliteConnectionCustomizer))
        .build(manager)?;

    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("Failed to run migrations: {e}"))?;

    info!("Database initialized with WAL mode");

    Ok(pool)
}

/// Gets a connection from the pool, retrying with exponential backoff.
pub fn get_connection_with_retry(pool: &DbPool) -> Result<DbConnection, diesel::r2d2::Error> {
    let mut attempts = 0;
    let max_attempts = 5;

    loop {
        match pool.get() {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                attempts += 1;
                if attempts >= max_attempts {
                    return Err(diesel::r2d2::Error::ConnectionError(
                        diesel::ConnectionError::BadConnection(format!(
                            "Failed to get connection after {max_attempts} attempts: {e}"
                        )),
                    ));
                }
                let delay = Duration::from_millis(10 * (1 << (attempts - 1)));
                std::thread::sleep(delay);
            }
        }
    }
}

/// Maps a pool acquisition failure into a diesel error so database operation
/// modules can expose a single error type.
pub fn pool_error(e: diesel::r2d2::Error) -> diesel::result::Error {
    diesel::result::Error::DatabaseError(
        diesel::result::DatabaseErrorKind::UnableToSendCommand,
        Box::new(e.to_string()),
    )
}
