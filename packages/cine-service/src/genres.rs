//! Genre-level aggregate reports.

use serde::{Deserialize, Serialize};

use cine_domain::scoring::{self, GenrePersonality, UserGenreMean, UserTraits};
use cine_storage::queries;

use crate::{CineService, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularGenre {
	pub genre: String,
	pub average_rating: f64,
	pub count: i64,
	pub popularity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarisingGenre {
	pub genre: String,
	pub high_rating_pct: f64,
	pub low_rating_pct: f64,
}

impl CineService {
	pub async fn popular_genres(&self) -> Result<Vec<PopularGenre>> {
		let rows = queries::popular_genres(&self.db.pool).await?;

		Ok(rows
			.into_iter()
			.map(|row| PopularGenre {
				genre: row.genre,
				average_rating: row.average_rating,
				count: row.count,
				popularity: row.popularity,
			})
			.collect())
	}

	pub async fn polarising_genres(&self) -> Result<Vec<PolarisingGenre>> {
		let reports = &self.cfg.reports;
		let rows = queries::polarising_genres(
			&self.db.pool,
			reports.high_rating_threshold,
			reports.low_rating_threshold,
			i64::from(reports.polarising_limit),
		)
		.await?;

		Ok(rows
			.into_iter()
			.map(|row| PolarisingGenre {
				genre: row.genre,
				high_rating_pct: row.high_rating_pct,
				low_rating_pct: row.low_rating_pct,
			})
			.collect())
	}

	/// Pearson coefficient per genre and trait between trait scores and users' genre means.
	pub async fn genre_personality_correlation(&self) -> Result<Vec<GenrePersonality>> {
		let mut conn = self.db.acquire().await?;
		let traits = queries::user_traits(&mut *conn)
			.await?
			.into_iter()
			.map(|row| UserTraits {
				user_id: row.user_id,
				openness: row.openness,
				agreeableness: row.agreeableness,
				extraversion: row.extraversion,
				emotional_stability: row.emotional_stability,
				conscientiousness: row.conscientiousness,
			})
			.collect::<Vec<_>>();
		let means = queries::user_genre_means(&mut *conn)
			.await?
			.into_iter()
			.map(|row| UserGenreMean {
				user_id: row.user_id,
				genre: row.genre,
				mean_rating: row.mean_rating,
			})
			.collect::<Vec<_>>();

		tracing::debug!(users = traits.len(), rows = means.len(), "Correlating genre personality.");

		Ok(scoring::genre_personality_correlations(&traits, &means))
	}
}
