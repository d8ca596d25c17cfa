//! Statistical estimators behind the detail view and the genre reports.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::{
	sampling::RaterRating,
	stats::{mean, pearson},
};

/// One row of the store's rating-over-expected aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreBaseline {
	pub user_id: i64,
	pub genre: String,
	pub rating_over_expected: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserGenreMean {
	pub user_id: i64,
	pub genre: String,
	pub mean_rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBounds {
	pub min: i32,
	pub max: i32,
}

/// Pearson coefficient between users' mean ratings in two genres, `genre_a < genre_b`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenrePairCorrelation {
	pub genre_a: String,
	pub genre_b: String,
	pub correlation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserTraits {
	pub user_id: i64,
	pub openness: f64,
	pub agreeableness: f64,
	pub extraversion: f64,
	pub emotional_stability: f64,
	pub conscientiousness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenrePersonality {
	pub genre: String,
	pub openness: Option<f64>,
	pub agreeableness: Option<f64>,
	pub extraversion: Option<f64>,
	pub emotional_stability: Option<f64>,
	pub conscientiousness: Option<f64>,
}

/// Deviation-adjusted mean of the sampled ratings.
///
/// Each sampled rater's rating is corrected by their average rating-over-expected across the
/// movie's genres. Raters without a baseline in any of those genres do not contribute.
pub fn predict_rating(
	sample: &[RaterRating],
	genres: &[String],
	baselines: &[GenreBaseline],
	bounds: RatingBounds,
) -> Option<f64> {
	if sample.is_empty() || genres.is_empty() || baselines.is_empty() {
		return None;
	}

	let wanted = genres.iter().map(|genre| genre.to_lowercase()).collect::<HashSet<_>>();
	let mut deviations: HashMap<i64, Vec<f64>> = HashMap::new();

	for baseline in baselines {
		if !baseline.rating_over_expected.is_finite() ||
			!wanted.contains(&baseline.genre.to_lowercase())
		{
			continue;
		}

		deviations.entry(baseline.user_id).or_default().push(baseline.rating_over_expected);
	}

	let adjusted = sample
		.iter()
		.filter_map(|rater| {
			let deviation = mean(deviations.get(&rater.user_id)?)?;

			Some(f64::from(rater.rating) - deviation)
		})
		.collect::<Vec<_>>();
	let estimate = mean(&adjusted)?;

	Some(estimate.clamp(f64::from(bounds.min), f64::from(bounds.max)))
}

/// Correlates every genre pair with at least one side in `focus`.
///
/// Pairs entirely outside `focus` can never be suggested for it, so they are not computed.
pub fn genre_pair_correlations(
	means: &[UserGenreMean],
	focus: &[String],
) -> Vec<GenrePairCorrelation> {
	let focus = focus.iter().map(|genre| genre.to_lowercase()).collect::<HashSet<_>>();
	let by_genre = group_by_genre(means);
	let genres = by_genre.keys().collect::<Vec<_>>();
	let mut pairs = Vec::new();

	for (i, genre_a) in genres.iter().enumerate() {
		for genre_b in &genres[i + 1..] {
			if !focus.contains(&genre_a.to_lowercase()) && !focus.contains(&genre_b.to_lowercase()) {
				continue;
			}

			let users_a = &by_genre[*genre_a];
			let users_b = &by_genre[*genre_b];
			let (xs, ys): (Vec<f64>, Vec<f64>) = users_a
				.iter()
				.filter_map(|(user_id, a)| users_b.get(user_id).map(|b| (*a, *b)))
				.unzip();

			if let Some(correlation) = pearson(&xs, &ys) {
				pairs.push(GenrePairCorrelation {
					genre_a: (*genre_a).clone(),
					genre_b: (*genre_b).clone(),
					correlation,
				});
			}
		}
	}

	pairs
}

/// Top `limit` genres outside `movie_genres` that correlate with one inside it.
///
/// Only pairs with exactly one side in `movie_genres` qualify; the other side is suggested.
pub fn correlated_genres(
	pairs: &[GenrePairCorrelation],
	movie_genres: &[String],
	limit: usize,
) -> Vec<String> {
	let own = movie_genres.iter().map(|genre| genre.to_lowercase()).collect::<HashSet<_>>();
	let mut candidates = pairs
		.iter()
		.filter_map(|pair| {
			let a_in = own.contains(&pair.genre_a.to_lowercase());
			let b_in = own.contains(&pair.genre_b.to_lowercase());

			match (a_in, b_in) {
				(true, false) => Some((pair.correlation, pair.genre_b.as_str())),
				(false, true) => Some((pair.correlation, pair.genre_a.as_str())),
				_ => None,
			}
		})
		.collect::<Vec<_>>();

	candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for (_, genre) in candidates {
		if out.len() >= limit {
			break;
		}
		if seen.insert(genre) {
			out.push(genre.to_string());
		}
	}

	out
}

pub fn genre_personality_correlations(
	traits: &[UserTraits],
	means: &[UserGenreMean],
) -> Vec<GenrePersonality> {
	let traits_by_user = traits.iter().map(|row| (row.user_id, row)).collect::<HashMap<_, _>>();

	group_by_genre(means)
		.into_iter()
		.map(|(genre, users)| {
			let rows = users
				.iter()
				.filter_map(|(user_id, mean_rating)| {
					traits_by_user.get(user_id).map(|traits| (*traits, *mean_rating))
				})
				.collect::<Vec<_>>();
			let ratings = rows.iter().map(|(_, rating)| *rating).collect::<Vec<_>>();
			let coefficient = |pick: fn(&UserTraits) -> f64| {
				let scores = rows.iter().map(|(traits, _)| pick(traits)).collect::<Vec<_>>();

				pearson(&scores, &ratings)
			};

			GenrePersonality {
				openness: coefficient(|t| t.openness),
				agreeableness: coefficient(|t| t.agreeableness),
				extraversion: coefficient(|t| t.extraversion),
				emotional_stability: coefficient(|t| t.emotional_stability),
				conscientiousness: coefficient(|t| t.conscientiousness),
				genre,
			}
		})
		.collect()
}

fn group_by_genre(means: &[UserGenreMean]) -> BTreeMap<String, BTreeMap<i64, f64>> {
	let mut by_genre: BTreeMap<String, BTreeMap<i64, f64>> = BTreeMap::new();

	for row in means {
		if row.mean_rating.is_finite() {
			by_genre.entry(row.genre.clone()).or_default().insert(row.user_id, row.mean_rating);
		}
	}

	by_genre
}

#[cfg(test)]
mod tests {
	use super::*;

	const BOUNDS: RatingBounds = RatingBounds { min: 1, max: 5 };

	fn baseline(user_id: i64, genre: &str, value: f64) -> GenreBaseline {
		GenreBaseline { user_id, genre: genre.to_string(), rating_over_expected: value }
	}

	fn user_mean(user_id: i64, genre: &str, mean_rating: f64) -> UserGenreMean {
		UserGenreMean { user_id, genre: genre.to_string(), mean_rating }
	}

	fn pair(a: &str, b: &str, correlation: f64) -> GenrePairCorrelation {
		GenrePairCorrelation { genre_a: a.to_string(), genre_b: b.to_string(), correlation }
	}

	fn genres(names: &[&str]) -> Vec<String> {
		names.iter().map(|name| name.to_string()).collect()
	}

	#[test]
	fn prediction_subtracts_average_deviation() {
		let sample = [RaterRating { user_id: 1, rating: 5 }, RaterRating { user_id: 2, rating: 3 }];
		let baselines = [
			baseline(1, "Drama", 1.0),
			baseline(1, "Crime", 0.0),
			baseline(2, "drama", -0.5),
			baseline(2, "Comedy", 3.0),
		];
		let estimate =
			predict_rating(&sample, &genres(&["Drama", "Crime"]), &baselines, BOUNDS).unwrap();

		// User 1: 5 - 0.5 = 4.5. User 2: 3 + 0.5 = 3.5.
		assert!((estimate - 4.0).abs() < 1e-12, "Unexpected estimate {estimate}");
	}

	#[test]
	fn prediction_skips_raters_without_baseline() {
		let sample = [RaterRating { user_id: 1, rating: 4 }, RaterRating { user_id: 9, rating: 1 }];
		let estimate =
			predict_rating(&sample, &genres(&["Drama"]), &[baseline(1, "Drama", 0.0)], BOUNDS);

		assert_eq!(estimate, Some(4.0));
	}

	#[test]
	fn prediction_is_clamped_to_scale() {
		let sample = [RaterRating { user_id: 1, rating: 5 }];
		let estimate =
			predict_rating(&sample, &genres(&["Drama"]), &[baseline(1, "Drama", -2.0)], BOUNDS);

		assert_eq!(estimate, Some(5.0));
	}

	#[test]
	fn prediction_without_data_is_none() {
		let sample = [RaterRating { user_id: 1, rating: 5 }];
		let rows = [baseline(1, "Drama", 0.2)];

		assert_eq!(predict_rating(&[], &genres(&["Drama"]), &rows, BOUNDS), None);
		assert_eq!(predict_rating(&sample, &[], &rows, BOUNDS), None);
		assert_eq!(predict_rating(&sample, &genres(&["Drama"]), &[], BOUNDS), None);
		assert_eq!(predict_rating(&sample, &genres(&["Horror"]), &rows, BOUNDS), None);
	}

	#[test]
	fn pair_correlations_use_shared_users_only() {
		let means = [
			user_mean(1, "Drama", 1.0),
			user_mean(2, "Drama", 2.0),
			user_mean(3, "Drama", 3.0),
			user_mean(1, "Action", 2.0),
			user_mean(2, "Action", 4.0),
			user_mean(3, "Action", 6.0),
			user_mean(4, "Action", 1.0),
			user_mean(1, "Comedy", 4.0),
		];
		let pairs = genre_pair_correlations(&means, &genres(&["Drama"]));

		assert_eq!(pairs.len(), 1);
		assert_eq!(pairs[0].genre_a, "Action");
		assert_eq!(pairs[0].genre_b, "Drama");
		assert!((pairs[0].correlation - 1.0).abs() < 1e-12);
	}

	#[test]
	fn pair_correlations_skip_pairs_outside_the_focus() {
		let means = [
			user_mean(1, "Drama", 1.0),
			user_mean(2, "Drama", 2.0),
			user_mean(3, "Drama", 3.0),
			user_mean(1, "Action", 2.0),
			user_mean(2, "Action", 1.0),
			user_mean(3, "Action", 3.0),
			user_mean(1, "Comedy", 5.0),
			user_mean(2, "Comedy", 4.0),
			user_mean(3, "Comedy", 1.0),
		];
		let all = genre_pair_correlations(&means, &genres(&["Action", "Comedy", "Drama"]));
		let focused = genre_pair_correlations(&means, &genres(&["drama"]));
		let names = focused
			.iter()
			.map(|pair| (pair.genre_a.as_str(), pair.genre_b.as_str()))
			.collect::<Vec<_>>();

		assert_eq!(all.len(), 3);
		assert_eq!(names, vec![("Action", "Drama"), ("Comedy", "Drama")]);
		assert_eq!(
			correlated_genres(&focused, &genres(&["Drama"]), 2),
			correlated_genres(&all, &genres(&["Drama"]), 2)
		);
		assert!(genre_pair_correlations(&means, &[]).is_empty());
	}

	#[test]
	fn correlated_genres_exclude_own_genres() {
		let pairs = [
			pair("Action", "Drama", 0.9),
			pair("Comedy", "Drama", 0.4),
			pair("Drama", "Horror", 0.7),
			pair("Action", "Horror", 0.99),
			pair("Crime", "Drama", -0.2),
		];
		let picked = correlated_genres(&pairs, &genres(&["Drama"]), 2);

		assert_eq!(picked, vec!["Action".to_string(), "Horror".to_string()]);
	}

	#[test]
	fn correlated_genres_skip_pairs_inside_the_movie() {
		let pairs = [pair("Action", "Drama", 0.9), pair("Action", "Comedy", 0.5)];
		let picked = correlated_genres(&pairs, &genres(&["Action", "Drama"]), 2);

		assert_eq!(picked, vec!["Comedy".to_string()]);
	}

	#[test]
	fn correlated_genres_deduplicate_the_other_side() {
		let pairs = [
			pair("Action", "Drama", 0.8),
			pair("Action", "Crime", 0.7),
			pair("Comedy", "Crime", 0.6),
			pair("Crime", "Drama", 0.1),
		];
		let picked = correlated_genres(&pairs, &genres(&["Drama", "Crime"]), 2);

		assert_eq!(picked, vec!["Action".to_string(), "Comedy".to_string()]);
	}

	#[test]
	fn correlated_genres_without_pairs_are_empty() {
		assert!(correlated_genres(&[], &genres(&["Drama"]), 2).is_empty());
		assert!(correlated_genres(&[pair("A", "B", 0.3)], &[], 2).is_empty());
	}

	#[test]
	fn personality_correlation_per_trait() {
		let traits = [
			UserTraits {
				user_id: 1,
				openness: 1.0,
				agreeableness: 3.0,
				extraversion: 2.0,
				emotional_stability: 5.0,
				conscientiousness: 4.0,
			},
			UserTraits {
				user_id: 2,
				openness: 2.0,
				agreeableness: 3.0,
				extraversion: 1.0,
				emotional_stability: 4.0,
				conscientiousness: 4.0,
			},
			UserTraits {
				user_id: 3,
				openness: 3.0,
				agreeableness: 3.0,
				extraversion: 3.0,
				emotional_stability: 3.0,
				conscientiousness: 4.0,
			},
		];
		let means = [
			user_mean(1, "Drama", 2.0),
			user_mean(2, "Drama", 3.0),
			user_mean(3, "Drama", 4.0),
			user_mean(1, "Comedy", 5.0),
		];
		let report = genre_personality_correlations(&traits, &means);

		assert_eq!(report.len(), 2);
		assert_eq!(report[0].genre, "Comedy");
		assert_eq!(report[0].openness, None);

		let drama = &report[1];

		assert_eq!(drama.genre, "Drama");
		assert!((drama.openness.unwrap() - 1.0).abs() < 1e-12);
		assert!((drama.emotional_stability.unwrap() + 1.0).abs() < 1e-12);
		assert!((drama.extraversion.unwrap() - 0.5).abs() < 1e-12);
		assert_eq!(drama.agreeableness, None);
		assert_eq!(drama.conscientiousness, None);
	}
}
