use std::time::Duration;

use sqlx::{PgPool, pool::PoolConnection, postgres::PgPoolOptions};

use crate::Result;

/// Shared pool handle. Callers check out one connection per unit of work and return it on drop.
#[derive(Clone)]
pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &cine_config::Postgres) -> Result<Self> {
		let pool = PgPoolOptions::new()
			.max_connections(cfg.pool_max_conns)
			.acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
			.connect(&cfg.dsn)
			.await?;

		Ok(Self { pool })
	}

	/// Builds the pool without opening a connection until the first checkout.
	pub fn connect_lazy(cfg: &cine_config::Postgres) -> Result<Self> {
		let pool = PgPoolOptions::new()
			.max_connections(cfg.pool_max_conns)
			.acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
			.connect_lazy(&cfg.dsn)?;

		Ok(Self { pool })
	}

	pub async fn acquire(&self) -> Result<PoolConnection<sqlx::Postgres>> {
		Ok(self.pool.acquire().await?)
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}
}
