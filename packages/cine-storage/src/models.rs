use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCredit {
	pub name: String,
	pub character_name: Option<String>,
	pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorCredit {
	pub name: String,
	pub profile_path: Option<String>,
}

/// A movie row joined with its genres, credits and rating statistics.
#[derive(Debug, sqlx::FromRow)]
pub struct MovieRecord {
	pub id: i64,
	pub title: String,
	pub imdb_id: i64,
	pub tmdb_id: i64,
	pub release_date: Date,
	pub runtime: i32,
	pub tagline: String,
	pub overview: String,
	pub poster_path: Option<String>,
	pub backdrop_path: Option<String>,
	pub budget: i64,
	pub revenue: i64,
	pub status: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub genres: Vec<String>,
	pub actors: Json<Vec<ActorCredit>>,
	pub directors: Json<Vec<DirectorCredit>>,
	pub average_rating: f64,
	pub num_reviews: i64,
	pub popularity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct CatalogSummary {
	pub total_movies: i64,
	pub min_year: Option<i32>,
	pub max_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct RaterRow {
	pub user_id: i64,
	pub rating: i32,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserGenreMeanRow {
	pub user_id: i64,
	pub genre: String,
	pub mean_rating: f64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RatingOverExpectedRow {
	pub user_id: i64,
	pub genre: String,
	pub rating_over_expected: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct UserTraitsRow {
	pub user_id: i64,
	pub openness: f64,
	pub agreeableness: f64,
	pub extraversion: f64,
	pub emotional_stability: f64,
	pub conscientiousness: f64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct GenrePopularity {
	pub genre: String,
	pub average_rating: f64,
	pub count: i64,
	pub popularity: f64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct GenrePolarity {
	pub genre: String,
	pub high_rating_pct: f64,
	pub low_rating_pct: f64,
}
