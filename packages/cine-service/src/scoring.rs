//! Per-movie detail scores: predicted rating, rater baseline and correlated genres.

use cine_domain::{
	sampling::RaterRating,
	scoring::{self, RatingBounds, UserGenreMean},
};

use crate::{Result, ScoringPorts};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailScores {
	pub predicted_rating: Option<f64>,
	pub avg_user_rating: Option<f64>,
	pub correlated_genres: Vec<String>,
}

pub struct ScoringEngine {
	ports: ScoringPorts,
	bounds: RatingBounds,
	correlated_limit: usize,
}
impl ScoringEngine {
	pub fn new(cfg: &cine_config::Scoring, ports: ScoringPorts) -> Self {
		Self {
			ports,
			bounds: RatingBounds { min: cfg.rating_min, max: cfg.rating_max },
			correlated_limit: cfg.correlated_genre_limit as usize,
		}
	}

	/// Samples the movie's raters and adjusts their ratings by the store's genre baseline.
	pub async fn predicted_rating(
		&self,
		movie_id: i64,
		genres: &[String],
		raters: &[RaterRating],
	) -> Result<Option<f64>> {
		if raters.is_empty() || genres.is_empty() {
			return Ok(None);
		}

		let sample = self.ports.sampler.sample(movie_id, raters);
		let user_ids = sample.iter().map(|rater| rater.user_id).collect::<Vec<_>>();
		let lowered = genres.iter().map(|genre| genre.to_lowercase()).collect::<Vec<_>>();
		let baselines = self.ports.baselines.rating_over_expected(&user_ids, &lowered).await?;

		tracing::debug!(
			movie_id,
			raters = raters.len(),
			sampled = sample.len(),
			baselines = baselines.len(),
			"Computed predicted rating inputs."
		);

		Ok(scoring::predict_rating(&sample, genres, &baselines, self.bounds))
	}

	pub fn correlated_genres(&self, genres: &[String], means: &[UserGenreMean]) -> Vec<String> {
		if genres.is_empty() {
			return Vec::new();
		}

		let pairs = scoring::genre_pair_correlations(means, genres);

		scoring::correlated_genres(&pairs, genres, self.correlated_limit)
	}

	pub async fn detail_scores(
		&self,
		movie_id: i64,
		genres: &[String],
		raters: &[RaterRating],
		avg_user_rating: Option<f64>,
		means: &[UserGenreMean],
	) -> Result<DetailScores> {
		let predicted_rating = self.predicted_rating(movie_id, genres, raters).await?;

		Ok(DetailScores {
			predicted_rating,
			avg_user_rating,
			correlated_genres: self.correlated_genres(genres, means),
		})
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	};

	use cine_domain::{sampling::FractionSampler, scoring::GenreBaseline};

	use super::*;
	use crate::{BoxFuture, RatingBaselineSource};

	struct InMemoryBaselines {
		rows: Vec<GenreBaseline>,
		calls: AtomicUsize,
		last_genres: Mutex<Vec<String>>,
	}
	impl InMemoryBaselines {
		fn new(rows: Vec<GenreBaseline>) -> Self {
			Self { rows, calls: AtomicUsize::new(0), last_genres: Mutex::new(Vec::new()) }
		}
	}
	impl RatingBaselineSource for InMemoryBaselines {
		fn rating_over_expected<'a>(
			&'a self,
			user_ids: &'a [i64],
			genres: &'a [String],
		) -> BoxFuture<'a, Result<Vec<GenreBaseline>>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			*self.last_genres.lock().expect("lock") = genres.to_vec();

			let rows = self
				.rows
				.iter()
				.filter(|row| {
					user_ids.contains(&row.user_id) && genres.contains(&row.genre.to_lowercase())
				})
				.cloned()
				.collect();

			Box::pin(async move { Ok(rows) })
		}
	}

	fn scoring_cfg(fraction: f64, seed: Option<u64>) -> cine_config::Scoring {
		cine_config::Scoring {
			sample_fraction: fraction,
			sample_seed: seed,
			correlated_genre_limit: 2,
			rating_min: 1,
			rating_max: 5,
		}
	}

	fn engine(
		baselines: Arc<InMemoryBaselines>,
		fraction: f64,
		seed: Option<u64>,
	) -> ScoringEngine {
		let cfg = scoring_cfg(fraction, seed);
		let ports = ScoringPorts {
			baselines,
			sampler: Arc::new(FractionSampler::new(cfg.sample_fraction, cfg.sample_seed)),
		};

		ScoringEngine::new(&cfg, ports)
	}

	fn raters() -> Vec<RaterRating> {
		(1..=40).map(|user_id| RaterRating { user_id, rating: (user_id % 5 + 1) as i32 }).collect()
	}

	fn drama_baselines() -> Vec<GenreBaseline> {
		(1..=40)
			.map(|user_id| GenreBaseline {
				user_id,
				genre: "Drama".to_string(),
				rating_over_expected: (user_id % 3) as f64 * 0.25 - 0.25,
			})
			.collect()
	}

	fn genres(names: &[&str]) -> Vec<String> {
		names.iter().map(|name| name.to_string()).collect()
	}

	#[tokio::test]
	async fn seeded_prediction_is_reproducible() {
		let source = Arc::new(InMemoryBaselines::new(drama_baselines()));
		let engine = engine(source.clone(), 0.1, Some(11));
		let first = engine
			.predicted_rating(3, &genres(&["Drama"]), &raters())
			.await
			.expect("Prediction must not fail.");
		let second = engine
			.predicted_rating(3, &genres(&["Drama"]), &raters())
			.await
			.expect("Prediction must not fail.");

		assert!(first.is_some());
		assert_eq!(first, second);
		assert_eq!(source.calls.load(Ordering::SeqCst), 2);
		assert_eq!(*source.last_genres.lock().expect("lock"), vec!["drama".to_string()]);
	}

	#[tokio::test]
	async fn unseeded_prediction_stays_within_observed_range() {
		let source = Arc::new(InMemoryBaselines::new(drama_baselines()));
		let engine = engine(source, 0.1, None);
		let adjusted = raters()
			.iter()
			.zip(drama_baselines())
			.map(|(rater, row)| f64::from(rater.rating) - row.rating_over_expected)
			.collect::<Vec<_>>();
		let lowest = adjusted.iter().copied().fold(f64::INFINITY, f64::min).max(1.0);
		let highest = adjusted.iter().copied().fold(f64::NEG_INFINITY, f64::max).min(5.0);

		for _ in 0..25 {
			let estimate = engine
				.predicted_rating(3, &genres(&["Drama"]), &raters())
				.await
				.expect("Prediction must not fail.")
				.expect("Every rater has a baseline.");

			assert!(
				(lowest..=highest).contains(&estimate),
				"Estimate {estimate} outside [{lowest}, {highest}]"
			);
		}
	}

	#[tokio::test]
	async fn missing_inputs_short_circuit() {
		let source = Arc::new(InMemoryBaselines::new(drama_baselines()));
		let engine = engine(source.clone(), 0.5, Some(1));

		assert_eq!(engine.predicted_rating(1, &[], &raters()).await.expect("ok"), None);
		assert_eq!(engine.predicted_rating(1, &genres(&["Drama"]), &[]).await.expect("ok"), None);
		assert_eq!(source.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn empty_baseline_yields_no_prediction() {
		let source = Arc::new(InMemoryBaselines::new(Vec::new()));
		let engine = engine(source, 1.0, Some(1));
		let estimate = engine
			.predicted_rating(1, &genres(&["Drama"]), &raters())
			.await
			.expect("Prediction must not fail.");

		assert_eq!(estimate, None);
	}

	#[tokio::test]
	async fn full_sample_matches_hand_computed_estimate() {
		let rows = vec![
			GenreBaseline { user_id: 1, genre: "Drama".to_string(), rating_over_expected: 0.5 },
			GenreBaseline { user_id: 2, genre: "Drama".to_string(), rating_over_expected: -1.0 },
		];
		let engine = engine(Arc::new(InMemoryBaselines::new(rows)), 1.0, Some(5));
		let raters =
			[RaterRating { user_id: 1, rating: 4 }, RaterRating { user_id: 2, rating: 2 }];
		let scores = engine
			.detail_scores(9, &genres(&["Drama"]), &raters, Some(3.25), &[])
			.await
			.expect("Scores must not fail.");

		// (4 - 0.5 + 2 + 1) / 2
		assert_eq!(scores.predicted_rating, Some(3.25));
		assert_eq!(scores.avg_user_rating, Some(3.25));
		assert!(scores.correlated_genres.is_empty());
	}

	#[test]
	fn correlated_genres_honor_limit_and_own_set() {
		let engine = engine(Arc::new(InMemoryBaselines::new(Vec::new())), 0.1, Some(1));
		let means = [
			(1, "Drama", 1.0),
			(2, "Drama", 2.0),
			(3, "Drama", 3.0),
			(1, "Action", 1.5),
			(2, "Action", 2.5),
			(3, "Action", 3.0),
			(1, "Comedy", 3.0),
			(2, "Comedy", 2.0),
			(3, "Comedy", 1.0),
			(1, "Horror", 1.0),
			(2, "Horror", 3.0),
			(3, "Horror", 2.0),
		]
		.into_iter()
		.map(|(user_id, genre, mean_rating)| UserGenreMean {
			user_id,
			genre: genre.to_string(),
			mean_rating,
		})
		.collect::<Vec<_>>();
		let picked = engine.correlated_genres(&genres(&["Drama"]), &means);

		assert_eq!(picked, vec!["Action".to_string(), "Horror".to_string()]);
		assert!(engine.correlated_genres(&[], &means).is_empty());
	}
}
