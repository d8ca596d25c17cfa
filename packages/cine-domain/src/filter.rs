//! Parses optional listing criteria into typed predicates.
//!
//! Blank criteria are absent. Numeric lists collapse to an inclusive `[min, max]` range and any
//! token that is not an integer is a hard error.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
	#[error("Invalid {field} filter: {value:?} is not a comma-separated list of integers.")]
	InvalidFilterFormat { field: &'static str, value: String },
}

/// Raw criteria as received from the request layer.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
	pub genres: Option<String>,
	pub release_year: Option<String>,
	pub rating: Option<String>,
	pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	/// The movie must carry every listed genre. Names are lower-cased.
	Genres { names: Vec<String> },
	YearRange { min: i32, max: i32 },
	RatingRange { min: i32, max: i32 },
	/// `pattern` is already escaped and wrapped for `ILIKE`.
	Text { pattern: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
	predicates: Vec<Predicate>,
}
impl FilterSet {
	pub fn from_criteria(criteria: &FilterCriteria) -> Result<Self, FilterError> {
		let mut set = Self::default();

		if let Some(names) = criteria.genres.as_deref().and_then(parse_genres) {
			set.push(Predicate::Genres { names });
		}
		if let Some((min, max)) = parse_range("release_year", criteria.release_year.as_deref())? {
			set.push(Predicate::YearRange { min, max });
		}
		if let Some((min, max)) = parse_range("rating", criteria.rating.as_deref())? {
			set.push(Predicate::RatingRange { min, max });
		}
		if let Some(query) = criteria.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
			set.push(Predicate::Text { pattern: format!("%{}%", escape_like(query)) });
		}

		Ok(set)
	}

	pub fn push(&mut self, predicate: Predicate) {
		self.predicates.push(predicate);
	}

	pub fn is_empty(&self) -> bool {
		self.predicates.is_empty()
	}

	pub fn predicates(&self) -> &[Predicate] {
		&self.predicates
	}
}

fn parse_genres(raw: &str) -> Option<Vec<String>> {
	let names = raw
		.split(',')
		.map(|name| name.trim().to_lowercase())
		.filter(|name| !name.is_empty())
		.collect::<BTreeSet<_>>();

	if names.is_empty() {
		return None;
	}

	Some(names.into_iter().collect())
}

fn parse_range(field: &'static str, raw: Option<&str>) -> Result<Option<(i32, i32)>, FilterError> {
	let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
		return Ok(None);
	};
	let mut min = i32::MAX;
	let mut max = i32::MIN;

	for token in raw.split(',') {
		let value = token.trim().parse::<i32>().map_err(|_| FilterError::InvalidFilterFormat {
			field,
			value: raw.to_string(),
		})?;

		min = min.min(value);
		max = max.max(value);
	}

	Ok(Some((min, max)))
}

fn escape_like(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn criteria() -> FilterCriteria {
		FilterCriteria::default()
	}

	#[test]
	fn absent_criteria_yield_no_predicates() {
		let set = FilterSet::from_criteria(&criteria()).expect("Empty criteria must parse.");

		assert!(set.is_empty());
		assert!(set.predicates().is_empty());
	}

	#[test]
	fn blank_values_are_absent() {
		let set = FilterSet::from_criteria(&FilterCriteria {
			genres: Some(" , ".to_string()),
			release_year: Some("  ".to_string()),
			rating: Some(String::new()),
			query: Some("\t".to_string()),
		})
		.expect("Blank criteria must parse.");

		assert!(set.is_empty());
	}

	#[test]
	fn year_list_becomes_inclusive_range() {
		let set = FilterSet::from_criteria(&FilterCriteria {
			release_year: Some("2020, 1995,2003".to_string()),
			..criteria()
		})
		.expect("Years must parse.");

		assert_eq!(set.predicates(), &[Predicate::YearRange { min: 1995, max: 2020 }]);
	}

	#[test]
	fn unparsable_years_fail() {
		let err = FilterSet::from_criteria(&FilterCriteria {
			release_year: Some("abc".to_string()),
			..criteria()
		})
		.expect_err("Expected invalid year to fail.");

		assert_eq!(
			err,
			FilterError::InvalidFilterFormat { field: "release_year", value: "abc".to_string() }
		);
	}

	#[test]
	fn empty_tokens_fail() {
		let result = FilterSet::from_criteria(&FilterCriteria {
			rating: Some("2,".to_string()),
			..criteria()
		});

		assert!(matches!(result, Err(FilterError::InvalidFilterFormat { field: "rating", .. })));
	}

	#[test]
	fn genres_are_normalized_and_deduplicated() {
		let set = FilterSet::from_criteria(&FilterCriteria {
			genres: Some("Drama, comedy,DRAMA".to_string()),
			..criteria()
		})
		.expect("Genres must parse.");

		assert_eq!(
			set.predicates(),
			&[Predicate::Genres { names: vec!["comedy".to_string(), "drama".to_string()] }]
		);
	}

	#[test]
	fn text_query_is_escaped() {
		let set = FilterSet::from_criteria(&FilterCriteria {
			query: Some(" 100%_real\\ ".to_string()),
			..criteria()
		})
		.expect("Query must parse.");

		assert_eq!(set.predicates(), &[Predicate::Text { pattern: "%100\\%\\_real\\\\%".to_string() }]);
	}

	#[test]
	fn predicates_keep_criteria_order() {
		let set = FilterSet::from_criteria(&FilterCriteria {
			genres: Some("Drama".to_string()),
			release_year: Some("1990,2000".to_string()),
			rating: Some("5,3".to_string()),
			query: Some("matrix".to_string()),
		})
		.expect("Criteria must parse.");

		assert_eq!(
			set.predicates(),
			&[
				Predicate::Genres { names: vec!["drama".to_string()] },
				Predicate::YearRange { min: 1990, max: 2000 },
				Predicate::RatingRange { min: 3, max: 5 },
				Predicate::Text { pattern: "%matrix%".to_string() },
			]
		);
	}
}
