//! Rater sampling for the predicted-rating estimate.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaterRating {
	pub user_id: i64,
	pub rating: i32,
}

pub trait RaterSampler
where
	Self: Send + Sync,
{
	/// `raters` arrive in stable row order; implementations must not depend on anything else
	/// when they claim to be reproducible.
	fn sample(&self, movie_id: i64, raters: &[RaterRating]) -> Vec<RaterRating>;
}

/// Takes `ceil(fraction * n)` raters (at least one) in random-key order, ties on row order.
///
/// With a seed the draw is a pure function of the seed, the movie id and the rater rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionSampler {
	fraction: f64,
	seed: Option<u64>,
}
impl FractionSampler {
	pub fn new(fraction: f64, seed: Option<u64>) -> Self {
		Self { fraction: fraction.clamp(f64::MIN_POSITIVE, 1.0), seed }
	}

	pub fn sample_size(&self, population: usize) -> usize {
		if population == 0 {
			return 0;
		}

		((population as f64 * self.fraction).ceil() as usize).clamp(1, population)
	}

	/// Seeded draws must match across `rand` releases.
	fn rng(&self, movie_id: i64) -> ChaCha8Rng {
		match self.seed {
			Some(seed) => ChaCha8Rng::seed_from_u64(mix_seed(seed, movie_id)),
			None => ChaCha8Rng::from_os_rng(),
		}
	}
}
impl RaterSampler for FractionSampler {
	fn sample(&self, movie_id: i64, raters: &[RaterRating]) -> Vec<RaterRating> {
		let take = self.sample_size(raters.len());

		if take == 0 {
			return Vec::new();
		}

		let mut rng = self.rng(movie_id);
		let mut keyed = raters
			.iter()
			.enumerate()
			.map(|(row, rater)| (rng.random::<u64>(), row, *rater))
			.collect::<Vec<_>>();

		keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
		keyed.truncate(take);

		keyed.into_iter().map(|(_, _, rater)| rater).collect()
	}
}

fn mix_seed(seed: u64, movie_id: i64) -> u64 {
	seed ^ (movie_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
