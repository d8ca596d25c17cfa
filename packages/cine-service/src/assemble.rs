//! Result Assembler: shapes planner rows and detail scores into response envelopes.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use cine_storage::models::{ActorCredit, CatalogSummary, DirectorCredit, MovieRecord};

use crate::scoring::DetailScores;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
	pub id: i64,
	pub title: String,
	pub imdb_id: i64,
	pub tmdb_id: i64,
	#[serde(with = "crate::time_serde::date")]
	pub release_date: Date,
	pub runtime: i32,
	pub tagline: String,
	pub overview: String,
	pub poster_path: Option<String>,
	pub backdrop_path: Option<String>,
	pub budget: i64,
	pub revenue: i64,
	pub status: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
	pub genres: Vec<String>,
	pub actors: Vec<ActorCredit>,
	pub directors: Vec<DirectorCredit>,
	pub average_rating: f64,
	pub num_reviews: i64,
	pub popularity: f64,
}
impl From<MovieRecord> for MovieSummary {
	fn from(record: MovieRecord) -> Self {
		let mut genres = record.genres;

		genres.dedup();

		Self {
			id: record.id,
			title: record.title,
			imdb_id: record.imdb_id,
			tmdb_id: record.tmdb_id,
			release_date: record.release_date,
			runtime: record.runtime,
			tagline: record.tagline,
			overview: record.overview,
			poster_path: record.poster_path,
			backdrop_path: record.backdrop_path,
			budget: record.budget,
			revenue: record.revenue,
			status: record.status,
			created_at: record.created_at,
			updated_at: record.updated_at,
			genres,
			actors: record.actors.0,
			directors: record.directors.0,
			average_rating: finite_or_zero(record.average_rating),
			num_reviews: record.num_reviews,
			popularity: finite_or_zero(record.popularity),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieListResponse {
	pub total_movies: i64,
	pub min_year: Option<i32>,
	pub max_year: Option<i32>,
	pub genres: Vec<String>,
	pub movies: Vec<MovieSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
	#[serde(flatten)]
	pub movie: MovieSummary,
	pub avg_user_rating: Option<f64>,
	pub predicted_rating: Option<f64>,
	pub correlated_genres: Vec<String>,
}

/// Builds the listing envelope.
///
/// Year bounds and the genre vocabulary are always catalog-wide. The total is replaced by
/// `filtered_total` only when a filter was active.
pub fn listing(
	summary: CatalogSummary,
	genres: Vec<String>,
	filtered_total: Option<i64>,
	rows: Vec<MovieRecord>,
) -> MovieListResponse {
	MovieListResponse {
		total_movies: filtered_total.unwrap_or(summary.total_movies),
		min_year: summary.min_year,
		max_year: summary.max_year,
		genres,
		movies: rows.into_iter().map(MovieSummary::from).collect(),
	}
}

pub fn detail(record: MovieRecord, scores: DetailScores) -> MovieDetail {
	MovieDetail {
		movie: MovieSummary::from(record),
		avg_user_rating: scores.avg_user_rating,
		predicted_rating: scores.predicted_rating,
		correlated_genres: scores.correlated_genres,
	}
}

fn finite_or_zero(value: f64) -> f64 {
	if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
	use sqlx::types::Json;
	use time::macros::{date, datetime};

	use super::*;

	fn record(id: i64, genres: &[&str]) -> MovieRecord {
		MovieRecord {
			id,
			title: format!("Movie {id}"),
			imdb_id: 1000 + id,
			tmdb_id: 2000 + id,
			release_date: date!(2001 - 05 - 01),
			runtime: 100,
			tagline: String::new(),
			overview: String::new(),
			poster_path: None,
			backdrop_path: Some("/backdrop.jpg".to_string()),
			budget: 1,
			revenue: 2,
			status: "Released".to_string(),
			created_at: datetime!(2024-01-01 0:00 UTC),
			updated_at: datetime!(2024-01-02 0:00 UTC),
			genres: genres.iter().map(|genre| genre.to_string()).collect(),
			actors: Json(vec![ActorCredit {
				name: "Ada Actor".to_string(),
				character_name: Some("Lead".to_string()),
				profile_path: None,
			}]),
			directors: Json(Vec::new()),
			average_rating: 0.0,
			num_reviews: 0,
			popularity: 0.0,
		}
	}

	fn summary() -> CatalogSummary {
		CatalogSummary { total_movies: 6, min_year: Some(1995), max_year: Some(2020) }
	}

	#[test]
	fn unfiltered_listing_keeps_catalog_total() {
		let response = listing(summary(), vec!["Drama".to_string()], None, vec![record(1, &[])]);

		assert_eq!(response.total_movies, 6);
		assert_eq!(response.movies.len(), 1);
	}

	#[test]
	fn filtered_listing_overrides_total_but_not_bounds() {
		let response = listing(summary(), Vec::new(), Some(0), Vec::new());

		assert_eq!(response.total_movies, 0);
		assert_eq!(response.min_year, Some(1995));
		assert_eq!(response.max_year, Some(2020));
		assert!(response.movies.is_empty());
	}

	#[test]
	fn summary_renders_dates_and_credits() {
		let value = serde_json::to_value(MovieSummary::from(record(1, &["Drama", "Drama"])))
			.expect("Summary must serialize.");

		assert_eq!(value["release_date"], "2001-05-01");
		assert_eq!(value["created_at"], "2024-01-01T00:00:00Z");
		assert_eq!(value["genres"], serde_json::json!(["Drama"]));
		assert_eq!(value["actors"][0]["character_name"], "Lead");
		assert_eq!(value["average_rating"], 0.0);
	}

	#[test]
	fn detail_flattens_movie_fields() {
		let scores = DetailScores {
			predicted_rating: None,
			avg_user_rating: Some(3.5),
			correlated_genres: vec!["Comedy".to_string()],
		};
		let value = serde_json::to_value(detail(record(7, &["Drama"]), scores))
			.expect("Detail must serialize.");

		assert_eq!(value["id"], 7);
		assert_eq!(value["avg_user_rating"], 3.5);
		assert!(value["predicted_rating"].is_null());
		assert_eq!(value["correlated_genres"], serde_json::json!(["Comedy"]));
	}
}
