use std::{fmt, str::FromStr};

/// Fixed tie-break chain applied after the requested key so equal pages order identically.
pub const TIE_BREAK_SQL: &str =
	"s.num_reviews DESC, m.release_date DESC NULLS LAST, m.title ASC, m.id ASC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
	ReleaseDate,
	Title,
	AverageRating,
	Runtime,
	NumReviews,
	Popularity,
}
impl SortKey {
	pub const ALL: [Self; 6] = [
		Self::ReleaseDate,
		Self::Title,
		Self::AverageRating,
		Self::Runtime,
		Self::NumReviews,
		Self::Popularity,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::ReleaseDate => "release_date",
			Self::Title => "title",
			Self::AverageRating => "average_rating",
			Self::Runtime => "runtime",
			Self::NumReviews => "num_reviews",
			Self::Popularity => "popularity",
		}
	}

	fn column(self) -> &'static str {
		match self {
			Self::ReleaseDate => "m.release_date",
			Self::Title => "m.title",
			Self::AverageRating => "s.average_rating",
			Self::Runtime => "m.runtime",
			Self::NumReviews => "s.num_reviews",
			Self::Popularity => "s.popularity",
		}
	}
}
impl FromStr for SortKey {
	type Err = SortParseError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_lowercase().as_str() {
			"release_date" => Ok(Self::ReleaseDate),
			"title" => Ok(Self::Title),
			"average_rating" => Ok(Self::AverageRating),
			"runtime" => Ok(Self::Runtime),
			"num_reviews" => Ok(Self::NumReviews),
			"popularity" => Ok(Self::Popularity),
			_ => Err(SortParseError { field: "sort", value: raw.to_string() }),
		}
	}
}
impl fmt::Display for SortKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
	Asc,
	Desc,
}
impl SortOrder {
	fn keyword(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}
impl FromStr for SortOrder {
	type Err = SortParseError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_lowercase().as_str() {
			"asc" => Ok(Self::Asc),
			"desc" => Ok(Self::Desc),
			_ => Err(SortParseError { field: "sort_order", value: raw.to_string() }),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported {field} value {value:?}.")]
pub struct SortParseError {
	pub field: &'static str,
	pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
	pub key: SortKey,
	pub order: SortOrder,
}
impl SortSpec {
	pub fn new(key: SortKey, order: SortOrder) -> Self {
		Self { key, order }
	}

	pub fn order_by_sql(&self) -> String {
		format!(
			"ORDER BY {} {} NULLS LAST, {TIE_BREAK_SQL}",
			self.key.column(),
			self.order.keyword()
		)
	}
}
