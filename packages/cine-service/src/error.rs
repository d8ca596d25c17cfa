use cine_domain::{filter::FilterError, sort::SortParseError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid {field} filter: {value:?} is not a comma-separated list of integers.")]
	InvalidFilterFormat { field: String, value: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Data source error: {message}")]
	DataSource { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		tracing::error!(error = %err, "Catalog store query failed.");

		Self::DataSource { message: err.to_string() }
	}
}

impl From<cine_storage::Error> for Error {
	fn from(err: cine_storage::Error) -> Self {
		match err {
			cine_storage::Error::Sqlx(inner) => Self::from(inner),
		}
	}
}

impl From<FilterError> for Error {
	fn from(err: FilterError) -> Self {
		match err {
			FilterError::InvalidFilterFormat { field, value } =>
				Self::InvalidFilterFormat { field: field.to_string(), value },
		}
	}
}

impl From<SortParseError> for Error {
	fn from(err: SortParseError) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
