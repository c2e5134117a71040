use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::{OnceCell, OwnedSemaphorePermit, Semaphore};
use tracing::info;

use crate::config;

/// Errors from the store layer.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Query workers are shut down")]
    WorkersShutdown,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Store handle shared by every request: the connection pool plus the
/// bounded query-worker semaphore all store calls go through.
///
/// The worker bound is fixed at startup and independent of how many
/// requests are in flight, so a burst of listings queues on `checkout`
/// instead of saturating the pool.
#[derive(Clone)]
pub struct DbExecutor {
    pool: PgPool,
    workers: Arc<Semaphore>,
}

impl DbExecutor {
    pub fn new(pool: PgPool, max_concurrent_queries: usize) -> Self {
        Self {
            pool,
            workers: Arc::new(Semaphore::new(max_concurrent_queries)),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check out one query worker for the duration of a store call.
    ///
    /// The permit is released when dropped - including when the awaiting
    /// caller is cancelled, so a cancelled request never leaks a worker.
    pub async fn checkout(&self) -> Result<OwnedSemaphorePermit, DatabaseError> {
        self.workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DatabaseError::WorkersShutdown)
    }
}

static EXECUTOR: OnceCell<DbExecutor> = OnceCell::const_new();

/// Process-wide store access, initialized lazily from `DATABASE_URL`.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn executor() -> Result<DbExecutor, DatabaseError> {
        let executor = EXECUTOR
            .get_or_try_init(|| async {
                let url = std::env::var("DATABASE_URL")
                    .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
                let database = &config::config().database;

                let pool = PgPoolOptions::new()
                    .max_connections(database.max_connections)
                    .acquire_timeout(Duration::from_secs(database.connection_timeout_secs))
                    .connect(&url)
                    .await?;

                info!(
                    "Created database pool ({} connections, {} query workers)",
                    database.max_connections, database.max_concurrent_queries
                );
                Ok::<_, DatabaseError>(DbExecutor::new(pool, database.max_concurrent_queries))
            })
            .await?;
        Ok(executor.clone())
    }

    /// Pings the store to ensure connectivity.
    pub async fn health_check() -> Result<(), DatabaseError> {
        let db = Self::executor().await?;
        let _worker = db.checkout().await?;
        sqlx::query("SELECT 1").execute(db.pool()).await?;
        Ok(())
    }
}
