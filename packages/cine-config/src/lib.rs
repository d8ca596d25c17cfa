mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Listing, Postgres, Reports, Scoring, Service, Storage};

use std::{fs, path::Path};

use cine_domain::sort::{SortKey, SortOrder};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.listing.max_limit == 0 {
		return Err(Error::Validation {
			message: "listing.max_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.listing.default_limit == 0 || cfg.listing.default_limit > cfg.listing.max_limit {
		return Err(Error::Validation {
			message: "listing.default_limit must be between 1 and listing.max_limit.".to_string(),
		});
	}
	if cfg.listing.default_sort.parse::<SortKey>().is_err() {
		return Err(Error::Validation {
			message: format!(
				"listing.default_sort must be one of {}.",
				SortKey::ALL.map(SortKey::as_str).join(", ")
			),
		});
	}
	if cfg.listing.default_sort_order.parse::<SortOrder>().is_err() {
		return Err(Error::Validation {
			message: "listing.default_sort_order must be one of asc or desc.".to_string(),
		});
	}

	let fraction = cfg.scoring.sample_fraction;

	if !fraction.is_finite() {
		return Err(Error::Validation {
			message: "scoring.sample_fraction must be a finite number.".to_string(),
		});
	}
	if fraction <= 0.0 || fraction > 1.0 {
		return Err(Error::Validation {
			message: "scoring.sample_fraction must be in the range (0.0, 1.0].".to_string(),
		});
	}
	if cfg.scoring.rating_min >= cfg.scoring.rating_max {
		return Err(Error::Validation {
			message: "scoring.rating_min must be less than scoring.rating_max.".to_string(),
		});
	}
	if cfg.scoring.correlated_genre_limit == 0 {
		return Err(Error::Validation {
			message: "scoring.correlated_genre_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.reports.polarising_limit == 0 {
		return Err(Error::Validation {
			message: "reports.polarising_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.reports.low_rating_threshold >= cfg.reports.high_rating_threshold {
		return Err(Error::Validation {
			message: "reports.low_rating_threshold must be less than reports.high_rating_threshold."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
	if cfg.listing.default_sort.trim().is_empty() {
		cfg.listing.default_sort = "popularity".to_string();
	}
	if cfg.listing.default_sort_order.trim().is_empty() {
		cfg.listing.default_sort_order = "desc".to_string();
	}

	cfg.listing.default_sort = cfg.listing.default_sort.trim().to_lowercase();
	cfg.listing.default_sort_order = cfg.listing.default_sort_order.trim().to_lowercase();
}
