pub mod assemble;
pub mod genres;
pub mod movies;
pub mod planner;
pub mod scoring;
pub mod time_serde;

mod error;

pub use assemble::{MovieDetail, MovieListResponse, MovieSummary};
pub use cine_domain::scoring::GenrePersonality;
pub use error::{Error, Result};
pub use genres::{PolarisingGenre, PopularGenre};
pub use movies::ListMoviesRequest;
pub use scoring::{DetailScores, ScoringEngine};

use std::{future::Future, pin::Pin, sync::Arc};

use cine_config::Config;
use cine_domain::{
	sampling::{FractionSampler, RaterSampler},
	scoring::GenreBaseline,
};
use cine_storage::{db::Db, queries};
use sqlx::PgPool;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read port over the store-maintained per-user, per-genre rating-over-expected aggregate.
pub trait RatingBaselineSource
where
	Self: Send + Sync,
{
	/// `genres` are lower-cased names; rows for other users or genres must not be returned.
	fn rating_over_expected<'a>(
		&'a self,
		user_ids: &'a [i64],
		genres: &'a [String],
	) -> BoxFuture<'a, Result<Vec<GenreBaseline>>>;
}

pub struct PgRatingBaselines {
	pool: PgPool,
}
impl PgRatingBaselines {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl RatingBaselineSource for PgRatingBaselines {
	fn rating_over_expected<'a>(
		&'a self,
		user_ids: &'a [i64],
		genres: &'a [String],
	) -> BoxFuture<'a, Result<Vec<GenreBaseline>>> {
		Box::pin(async move {
			let rows = queries::rating_over_expected(&self.pool, user_ids, genres).await?;

			Ok(rows
				.into_iter()
				.map(|row| GenreBaseline {
					user_id: row.user_id,
					genre: row.genre,
					rating_over_expected: row.rating_over_expected,
				})
				.collect())
		})
	}
}

#[derive(Clone)]
pub struct ScoringPorts {
	pub baselines: Arc<dyn RatingBaselineSource>,
	pub sampler: Arc<dyn RaterSampler>,
}
impl ScoringPorts {
	pub fn from_config(cfg: &Config, db: &Db) -> Self {
		Self {
			baselines: Arc::new(PgRatingBaselines::new(db.pool.clone())),
			sampler: Arc::new(FractionSampler::new(
				cfg.scoring.sample_fraction,
				cfg.scoring.sample_seed,
			)),
		}
	}
}

/// Query engine facade. Holds no per-request state; every call checks out its own connection.
pub struct CineService {
	pub cfg: Config,
	pub db: Db,
	pub scoring: ScoringEngine,
}
impl CineService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let ports = ScoringPorts::from_config(&cfg, &db);

		Self::with_ports(cfg, db, ports)
	}

	pub fn with_ports(cfg: Config, db: Db, ports: ScoringPorts) -> Self {
		let scoring = ScoringEngine::new(&cfg.scoring, ports);

		Self { cfg, db, scoring }
	}
}
