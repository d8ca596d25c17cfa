use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub listing: Listing,
	#[serde(default)]
	pub scoring: Scoring,
	#[serde(default)]
	pub reports: Reports,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	#[serde(default = "default_acquire_timeout_ms")]
	pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
	pub default_limit: u32,
	pub max_limit: u32,
	/// One of release_date, title, average_rating, runtime, num_reviews, popularity.
	pub default_sort: String,
	/// Either "asc" or "desc".
	pub default_sort_order: String,
}
impl Default for Listing {
	fn default() -> Self {
		Self {
			default_limit: 20,
			max_limit: 100,
			default_sort: "popularity".to_string(),
			default_sort_order: "desc".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scoring {
	/// Share of a movie's raters drawn for the predicted rating.
	pub sample_fraction: f64,
	/// Pins the rater sample. Without a seed every request draws a fresh sample.
	pub sample_seed: Option<u64>,
	pub correlated_genre_limit: u32,
	pub rating_min: i32,
	pub rating_max: i32,
}
impl Default for Scoring {
	fn default() -> Self {
		Self {
			sample_fraction: 0.1,
			sample_seed: Some(0x5EED),
			correlated_genre_limit: 2,
			rating_min: 1,
			rating_max: 5,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reports {
	pub polarising_limit: u32,
	pub high_rating_threshold: i32,
	pub low_rating_threshold: i32,
}
impl Default for Reports {
	fn default() -> Self {
		Self { polarising_limit: 10, high_rating_threshold: 4, low_rating_threshold: 2 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_acquire_timeout_ms() -> u64 {
	5_000
}
