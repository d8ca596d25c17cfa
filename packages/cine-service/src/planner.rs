//! Query Planner: turns a filter set and a sort into the listing, count and detail reads.
//!
//! Count and page reads push the same predicates so the paginated total always matches the
//! rows the page is drawn from.

use sqlx::{Executor, Postgres, QueryBuilder};

use cine_domain::{
	filter::{FilterSet, Predicate},
	sort::SortSpec,
};
use cine_storage::{models::MovieRecord, queries};

use crate::Result;

const MOVIE_COLUMNS: &str = "\
	m.id,
	m.title,
	m.imdb_id,
	m.tmdb_id,
	m.release_date,
	m.runtime,
	m.tagline,
	m.overview,
	m.poster_path,
	m.backdrop_path,
	m.budget,
	m.revenue,
	m.status,
	m.created_at,
	m.updated_at";

const CREDIT_COLUMNS: &str = "\
	COALESCE(
		(
			SELECT array_agg(DISTINCT g.name ORDER BY g.name)
			FROM movie_genres mg
			JOIN genres g ON g.id = mg.genre_id
			WHERE mg.movie_id = m.id
		),
		ARRAY[]::TEXT[]
	) AS genres,
	COALESCE(
		(
			SELECT json_agg(
				json_build_object(
					'name', p.name,
					'character_name', mp.character_name,
					'profile_path', p.profile_path
				)
				ORDER BY mp.\"order\" NULLS LAST, p.name
			)
			FROM movie_people mp
			JOIN people p ON p.id = mp.person_id
			WHERE mp.movie_id = m.id AND LOWER(mp.role) = 'actor'
		),
		'[]'::json
	) AS actors,
	COALESCE(
		(
			SELECT json_agg(
				json_build_object('name', p.name, 'profile_path', p.profile_path)
				ORDER BY p.name
			)
			FROM movie_people mp
			JOIN people p ON p.id = mp.person_id
			WHERE mp.movie_id = m.id AND LOWER(mp.role) = 'director'
		),
		'[]'::json
	) AS directors";

#[derive(Debug, Clone)]
pub struct ListingPlan {
	pub filters: FilterSet,
	pub sort: SortSpec,
}
impl ListingPlan {
	pub fn new(filters: FilterSet, sort: SortSpec) -> Self {
		Self { filters, sort }
	}

	pub fn is_filtered(&self) -> bool {
		!self.filters.is_empty()
	}

	pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
		let mut builder = QueryBuilder::new(format!(
			"\
WITH {stats}
SELECT COUNT(*)::BIGINT
FROM movies m
JOIN movie_stats s ON s.movie_id = m.id",
			stats = queries::rating_stats_cte(),
		));

		push_filters(&mut builder, &self.filters);

		builder
	}

	pub fn page_query(&self, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
		let mut builder = QueryBuilder::new(enriched_select());

		push_filters(&mut builder, &self.filters);
		builder.push("\n");
		builder.push(self.sort.order_by_sql());
		builder.push("\nLIMIT ");
		builder.push_bind(limit);
		builder.push(" OFFSET ");
		builder.push_bind(offset);

		builder
	}
}

pub fn detail_query(movie_id: i64) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new(enriched_select());

	builder.push("\nWHERE m.id = ");
	builder.push_bind(movie_id);

	builder
}

pub async fn filtered_count<'e, E>(executor: E, plan: &ListingPlan) -> Result<i64>
where
	E: Executor<'e, Database = Postgres>,
{
	let mut builder = plan.count_query();
	let count = builder.build_query_scalar::<i64>().fetch_one(executor).await?;

	Ok(count)
}

pub async fn fetch_page<'e, E>(
	executor: E,
	plan: &ListingPlan,
	limit: i64,
	offset: i64,
) -> Result<Vec<MovieRecord>>
where
	E: Executor<'e, Database = Postgres>,
{
	let mut builder = plan.page_query(limit, offset);
	let rows = builder.build_query_as::<MovieRecord>().fetch_all(executor).await?;

	Ok(rows)
}

pub async fn fetch_movie<'e, E>(executor: E, movie_id: i64) -> Result<Option<MovieRecord>>
where
	E: Executor<'e, Database = Postgres>,
{
	let mut builder = detail_query(movie_id);
	let row = builder.build_query_as::<MovieRecord>().fetch_optional(executor).await?;

	Ok(row)
}

fn enriched_select() -> String {
	format!(
		"\
WITH {stats}
SELECT
{MOVIE_COLUMNS},
{CREDIT_COLUMNS},
	s.average_rating,
	s.num_reviews,
	s.popularity
FROM movies m
JOIN movie_stats s ON s.movie_id = m.id",
		stats = queries::rating_stats_cte(),
	)
}

/// Joins every predicate with `AND`; rows are `m` (movies) and `s` (rating statistics).
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &FilterSet) {
	for (i, predicate) in filters.predicates().iter().enumerate() {
		builder.push(if i == 0 { "\nWHERE " } else { "\n\tAND " });

		push_predicate(builder, predicate);
	}
}

fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
	match predicate {
		Predicate::Genres { names } => {
			builder.push(
				"\
m.id IN (
	SELECT mg.movie_id
	FROM movie_genres mg
	JOIN genres g ON g.id = mg.genre_id
	WHERE LOWER(g.name) = ANY(",
			);
			builder.push_bind(names.clone());
			builder.push(
				")
	GROUP BY mg.movie_id
	HAVING COUNT(DISTINCT LOWER(g.name)) = ",
			);
			// Names are deduplicated, so the list length is the number of distinct genres.
			builder.push_bind(names.len() as i64);
			builder.push("\n)");
		},
		Predicate::YearRange { min, max } => {
			builder.push("EXTRACT(YEAR FROM m.release_date)::INT BETWEEN ");
			builder.push_bind(*min);
			builder.push(" AND ");
			builder.push_bind(*max);
		},
		Predicate::RatingRange { min, max } => {
			builder.push("s.average_rating BETWEEN ");
			builder.push_bind(f64::from(*min));
			builder.push(" AND ");
			builder.push_bind(f64::from(*max));
		},
		Predicate::Text { pattern } => {
			builder.push("(\n\tm.title ILIKE ");
			builder.push_bind(pattern.clone());
			builder.push(
				"
	OR EXISTS (
		SELECT 1
		FROM movie_keywords mk
		JOIN keywords k ON k.id = mk.keyword_id
		WHERE mk.movie_id = m.id AND k.name ILIKE ",
			);
			builder.push_bind(pattern.clone());
			builder.push("\n\t)\n)");
		},
	}
}
