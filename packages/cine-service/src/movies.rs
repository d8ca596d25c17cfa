use cine_domain::{
	filter::{FilterCriteria, FilterSet},
	sampling::RaterRating,
	scoring::UserGenreMean,
	sort::{SortKey, SortOrder, SortSpec},
};
use cine_storage::queries;

use crate::{
	CineService, Error, MovieDetail, MovieListResponse, Result, assemble,
	planner::{self, ListingPlan},
};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ListMoviesRequest {
	pub genres: Option<String>,
	pub release_year: Option<String>,
	pub rating: Option<String>,
	pub query: Option<String>,
	pub sort: Option<String>,
	pub sort_order: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}
impl ListMoviesRequest {
	fn criteria(&self) -> FilterCriteria {
		FilterCriteria {
			genres: self.genres.clone(),
			release_year: self.release_year.clone(),
			rating: self.rating.clone(),
			query: self.query.clone(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
	pub limit: i64,
	pub offset: i64,
}

impl CineService {
	pub async fn list_movies(&self, req: ListMoviesRequest) -> Result<MovieListResponse> {
		let filters = FilterSet::from_criteria(&req.criteria())?;
		let sort = self.resolve_sort(req.sort.as_deref(), req.sort_order.as_deref())?;
		let page = self.resolve_page(req.limit, req.offset)?;
		let plan = ListingPlan::new(filters, sort);

		tracing::debug!(
			predicates = plan.filters.predicates().len(),
			sort = %sort.key,
			limit = page.limit,
			offset = page.offset,
			"Planned movie listing."
		);

		let mut conn = self.db.acquire().await?;
		let summary = queries::catalog_summary(&mut *conn).await?;
		let genres = queries::genre_vocabulary(&mut *conn).await?;
		let filtered_total = if plan.is_filtered() {
			Some(planner::filtered_count(&mut *conn, &plan).await?)
		} else {
			None
		};
		let rows = planner::fetch_page(&mut *conn, &plan, page.limit, page.offset).await?;

		Ok(assemble::listing(summary, genres, filtered_total, rows))
	}

	pub async fn get_movie(&self, movie_id: i64) -> Result<MovieDetail> {
		let mut conn = self.db.acquire().await?;
		let Some(record) = planner::fetch_movie(&mut *conn, movie_id).await? else {
			return Err(Error::NotFound { message: format!("Movie {movie_id} does not exist.") });
		};
		let raters = queries::movie_raters(&mut *conn, movie_id)
			.await?
			.into_iter()
			.map(|row| RaterRating { user_id: row.user_id, rating: row.rating })
			.collect::<Vec<_>>();
		let avg_user_rating = if raters.is_empty() {
			None
		} else {
			queries::average_rater_baseline(&mut *conn, movie_id).await?
		};
		let lowered = record.genres.iter().map(|genre| genre.to_lowercase()).collect::<Vec<_>>();
		let means = queries::user_genre_means_for_raters_of(&mut *conn, &lowered)
			.await?
			.into_iter()
			.map(|row| UserGenreMean {
				user_id: row.user_id,
				genre: row.genre,
				mean_rating: row.mean_rating,
			})
			.collect::<Vec<_>>();

		// The baseline port checks out its own connection.
		drop(conn);

		let scores = self
			.scoring
			.detail_scores(movie_id, &record.genres, &raters, avg_user_rating, &means)
			.await?;

		tracing::debug!(
			movie_id,
			raters = raters.len(),
			predicted = scores.predicted_rating.is_some(),
			correlated = scores.correlated_genres.len(),
			"Scored movie detail."
		);

		Ok(assemble::detail(record, scores))
	}

	pub async fn list_movie_ids(&self) -> Result<Vec<i64>> {
		Ok(queries::movie_ids(&self.db.pool).await?)
	}

	pub fn resolve_sort(&self, sort: Option<&str>, sort_order: Option<&str>) -> Result<SortSpec> {
		let key = match sort.map(str::trim).filter(|value| !value.is_empty()) {
			Some(value) => value.parse::<SortKey>()?,
			None => self.cfg.listing.default_sort.parse::<SortKey>()?,
		};
		let order = match sort_order.map(str::trim).filter(|value| !value.is_empty()) {
			Some(value) => value.parse::<SortOrder>()?,
			None => self.cfg.listing.default_sort_order.parse::<SortOrder>()?,
		};

		Ok(SortSpec::new(key, order))
	}

	/// A zero limit is rejected; limits above `listing.max_limit` are clamped.
	pub fn resolve_page(&self, limit: Option<u32>, offset: Option<u32>) -> Result<PageBounds> {
		let limit = limit.unwrap_or(self.cfg.listing.default_limit);

		if limit == 0 {
			return Err(Error::InvalidRequest {
				message: "limit must be greater than zero.".to_string(),
			});
		}

		Ok(PageBounds {
			limit: i64::from(limit.min(self.cfg.listing.max_limit)),
			offset: i64::from(offset.unwrap_or(0)),
		})
	}
}
