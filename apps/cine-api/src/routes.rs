use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{PathRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use serde::Serialize;

use cine_service::{
	Error, GenrePersonality, ListMoviesRequest, MovieDetail, MovieListResponse, PolarisingGenre,
	PopularGenre,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/movies", get(list_movies))
		.route("/movies/ids", get(list_movie_ids))
		.route("/movies/{movie_id}", get(get_movie))
		.route("/genres/popular", get(popular_genres))
		.route("/genres/polarising", get(polarising_genres))
		.route("/genres/personality", get(genre_personality))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_movies(
	State(state): State<AppState>,
	query: Result<Query<ListMoviesRequest>, QueryRejection>,
) -> Result<Json<MovieListResponse>, ApiError> {
	let Query(req) = query.map_err(|err| ApiError::bad_request(err.body_text()))?;
	let response = state.service.list_movies(req).await?;

	Ok(Json(response))
}

async fn list_movie_ids(State(state): State<AppState>) -> Result<Json<Vec<i64>>, ApiError> {
	let ids = state.service.list_movie_ids().await?;

	Ok(Json(ids))
}

async fn get_movie(
	State(state): State<AppState>,
	movie_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MovieDetail>, ApiError> {
	let Path(movie_id) = movie_id.map_err(|err| ApiError::bad_request(err.body_text()))?;
	let detail = state.service.get_movie(movie_id).await?;

	Ok(Json(detail))
}

async fn popular_genres(
	State(state): State<AppState>,
) -> Result<Json<Vec<PopularGenre>>, ApiError> {
	Ok(Json(state.service.popular_genres().await?))
}

async fn polarising_genres(
	State(state): State<AppState>,
) -> Result<Json<Vec<PolarisingGenre>>, ApiError> {
	Ok(Json(state.service.polarising_genres().await?))
}

async fn genre_personality(
	State(state): State<AppState>,
) -> Result<Json<Vec<GenrePersonality>>, ApiError> {
	Ok(Json(state.service.genre_personality_correlation().await?))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self { status, error_code, message: message.into() }
	}

	fn bad_request(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidFilterFormat { .. } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_FILTER_FORMAT", err.to_string()),
			Error::InvalidRequest { message } => Self::bad_request(message),
			Error::NotFound { message } => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			// Already logged where the data-source error was converted.
			Error::DataSource { .. } => Self::new(
				StatusCode::INTERNAL_SERVER_ERROR,
				"INTERNAL_ERROR",
				"Internal server error",
			),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
