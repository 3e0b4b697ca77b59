/// Database layer for Taskhub
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: applies the SQL files under `migrations/`
///
/// Write requests run inside a `sqlx::Transaction` begun from the pool; reads
/// use a pooled connection. Services receive `&mut PgConnection` either way,
/// so a dropped (uncommitted) transaction discards everything the request did.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     let mut tx = pool.begin().await?;
///     // ... service calls with `&mut tx` ...
///     tx.commit().await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
