use sqlx::{Executor, Postgres};

use crate::{
	Result,
	models::{
		CatalogSummary, GenrePolarity, GenrePopularity, RaterRow, RatingOverExpectedRow,
		UserGenreMeanRow, UserTraitsRow,
	},
};

/// Per-movie rating statistics for every catalog movie, exposed as `movie_stats`.
///
/// Movies without ratings get `average_rating = 0` and `num_reviews = 0`; `popularity` uses
/// [`popularity_sql`] so sorting and display read the same value.
pub fn rating_stats_cte() -> String {
	format!(
		"\
movie_ratings AS (
	SELECT
		m.id AS movie_id,
		COALESCE(AVG(ur.rating)::FLOAT8, 0) AS average_rating,
		COUNT(ur.rating) AS num_reviews
	FROM movies m
	LEFT JOIN user_ratings ur ON ur.movie_id = m.id
	GROUP BY m.id
),
movie_stats AS (
	SELECT
		movie_id,
		average_rating,
		num_reviews,
		{popularity} AS popularity
	FROM movie_ratings
)",
		popularity = popularity_sql("average_rating", "num_reviews"),
	)
}

/// `average * log10(count + 1)`, zero without reviews.
pub fn popularity_sql(average: &str, count: &str) -> String {
	format!("CASE WHEN {count} = 0 THEN 0::FLOAT8 ELSE {average} * LOG(({count} + 1)::FLOAT8) END")
}

pub async fn catalog_summary<'e, E>(executor: E) -> Result<CatalogSummary>
where
	E: Executor<'e, Database = Postgres>,
{
	let summary = sqlx::query_as::<_, CatalogSummary>(
		"\
SELECT
	COUNT(*) AS total_movies,
	MIN(EXTRACT(YEAR FROM release_date))::INT AS min_year,
	MAX(EXTRACT(YEAR FROM release_date))::INT AS max_year
FROM movies",
	)
	.fetch_one(executor)
	.await?;

	Ok(summary)
}

pub async fn genre_vocabulary<'e, E>(executor: E) -> Result<Vec<String>>
where
	E: Executor<'e, Database = Postgres>,
{
	let names = sqlx::query_scalar::<_, String>("SELECT name FROM genres ORDER BY name")
		.fetch_all(executor)
		.await?;

	Ok(names)
}

pub async fn movie_ids<'e, E>(executor: E) -> Result<Vec<i64>>
where
	E: Executor<'e, Database = Postgres>,
{
	let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM movies ORDER BY id")
		.fetch_all(executor)
		.await?;

	Ok(ids)
}

/// Raters of one movie in ascending user id, the stable order sampling relies on.
pub async fn movie_raters<'e, E>(executor: E, movie_id: i64) -> Result<Vec<RaterRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	let rows = sqlx::query_as::<_, RaterRow>(
		"SELECT user_id, rating FROM user_ratings WHERE movie_id = $1 ORDER BY user_id",
	)
	.bind(movie_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Mean over the movie's raters of each rater's all-time average rating.
pub async fn average_rater_baseline<'e, E>(executor: E, movie_id: i64) -> Result<Option<f64>>
where
	E: Executor<'e, Database = Postgres>,
{
	let value = sqlx::query_scalar::<_, Option<f64>>(
		"\
SELECT AVG(per_user.avg_rating)::FLOAT8
FROM (
	SELECT ur.user_id, AVG(ur.rating)::FLOAT8 AS avg_rating
	FROM user_ratings ur
	WHERE ur.user_id IN (SELECT user_id FROM user_ratings WHERE movie_id = $1)
	GROUP BY ur.user_id
) per_user",
	)
	.bind(movie_id)
	.fetch_one(executor)
	.await?;

	Ok(value)
}

pub async fn user_genre_means<'e, E>(executor: E) -> Result<Vec<UserGenreMeanRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	let rows = sqlx::query_as::<_, UserGenreMeanRow>(
		"\
SELECT ur.user_id, g.name AS genre, AVG(ur.rating)::FLOAT8 AS mean_rating
FROM user_ratings ur
JOIN movie_genres mg ON mg.movie_id = ur.movie_id
JOIN genres g ON g.id = mg.genre_id
GROUP BY ur.user_id, g.name
ORDER BY g.name, ur.user_id",
	)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Genre means of users who rated at least one movie in `genres` (lower-cased).
///
/// A pair with one side in `genres` only correlates users who rated both sides, so nobody
/// outside this population can affect it.
pub async fn user_genre_means_for_raters_of<'e, E>(
	executor: E,
	genres: &[String],
) -> Result<Vec<UserGenreMeanRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	if genres.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, UserGenreMeanRow>(
		"\
SELECT ur.user_id, g.name AS genre, AVG(ur.rating)::FLOAT8 AS mean_rating
FROM user_ratings ur
JOIN movie_genres mg ON mg.movie_id = ur.movie_id
JOIN genres g ON g.id = mg.genre_id
WHERE ur.user_id IN (
	SELECT r.user_id
	FROM user_ratings r
	JOIN movie_genres rmg ON rmg.movie_id = r.movie_id
	JOIN genres rg ON rg.id = rmg.genre_id
	WHERE LOWER(rg.name) = ANY($1)
)
GROUP BY ur.user_id, g.name
ORDER BY g.name, ur.user_id",
	)
	.bind(genres)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn user_traits<'e, E>(executor: E) -> Result<Vec<UserTraitsRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	let rows = sqlx::query_as::<_, UserTraitsRow>(
		"\
SELECT
	id AS user_id,
	openness,
	agreeableness,
	extraversion,
	emotional_stability,
	conscientiousness
FROM users
ORDER BY id",
	)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Reads the store-maintained `rating_over_expected_by_genre` aggregate.
///
/// `genres` must already be lower-cased.
pub async fn rating_over_expected<'e, E>(
	executor: E,
	user_ids: &[i64],
	genres: &[String],
) -> Result<Vec<RatingOverExpectedRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	if user_ids.is_empty() || genres.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, RatingOverExpectedRow>(
		"\
SELECT user_id, genre_name AS genre, rating_over_expected::FLOAT8 AS rating_over_expected
FROM rating_over_expected_by_genre
WHERE user_id = ANY($1) AND LOWER(genre_name) = ANY($2)
ORDER BY user_id, genre_name",
	)
	.bind(user_ids)
	.bind(genres)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn popular_genres<'e, E>(executor: E) -> Result<Vec<GenrePopularity>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"\
SELECT
	g.name AS genre,
	COALESCE(AVG(ur.rating)::FLOAT8, 0) AS average_rating,
	COUNT(ur.rating) AS count,
	COALESCE({popularity}, 0) AS popularity
FROM genres g
JOIN movie_genres mg ON mg.genre_id = g.id
LEFT JOIN user_ratings ur ON ur.movie_id = mg.movie_id
GROUP BY g.name
ORDER BY popularity DESC, g.name ASC",
		popularity = popularity_sql("AVG(ur.rating)::FLOAT8", "COUNT(ur.rating)"),
	);
	let rows = sqlx::query_as::<_, GenrePopularity>(&sql).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn polarising_genres<'e, E>(
	executor: E,
	high_threshold: i32,
	low_threshold: i32,
	limit: i64,
) -> Result<Vec<GenrePolarity>>
where
	E: Executor<'e, Database = Postgres>,
{
	let rows = sqlx::query_as::<_, GenrePolarity>(
		"\
SELECT
	genre,
	high_count * 100.0::FLOAT8 / total AS high_rating_pct,
	low_count * 100.0::FLOAT8 / total AS low_rating_pct
FROM (
	SELECT
		g.name AS genre,
		COUNT(ur.rating) FILTER (WHERE ur.rating >= $1) AS high_count,
		COUNT(ur.rating) FILTER (WHERE ur.rating <= $2) AS low_count,
		COUNT(ur.rating) AS total
	FROM genres g
	JOIN movie_genres mg ON mg.genre_id = g.id
	LEFT JOIN user_ratings ur ON ur.movie_id = mg.movie_id
	GROUP BY g.name
	HAVING COUNT(ur.rating) > 0
) counts
ORDER BY (high_count + low_count) * 100.0::FLOAT8 / total DESC, genre ASC
LIMIT $3",
	)
	.bind(high_threshold)
	.bind(low_threshold)
	.bind(limit)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}
