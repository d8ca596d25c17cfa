pub fn mean(values: &[f64]) -> Option<f64> {
	if values.is_empty() {
		return None;
	}

	Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Pearson correlation of paired samples.
///
/// Returns `None` for fewer than two pairs, mismatched lengths, or a side without variance, the
/// cases where Postgres' `corr()` yields NULL.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
	if xs.len() != ys.len() || xs.len() < 2 {
		return None;
	}

	let mean_x = mean(xs)?;
	let mean_y = mean(ys)?;
	let mut cov = 0.0;
	let mut var_x = 0.0;
	let mut var_y = 0.0;

	for (x, y) in xs.iter().zip(ys) {
		let dx = x - mean_x;
		let dy = y - mean_y;

		cov += dx * dy;
		var_x += dx * dx;
		var_y += dy * dy;
	}

	if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
		return None;
	}

	let r = cov / (var_x.sqrt() * var_y.sqrt());

	r.is_finite().then_some(r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mean_of_empty_is_none() {
		assert_eq!(mean(&[]), None);
		assert_eq!(mean(&[4.0, 5.0, 3.0]), Some(4.0));
	}

	#[test]
	fn perfect_correlations() {
		let xs = [1.0, 2.0, 3.0, 4.0];

		assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
		assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
	}

	#[test]
	fn known_coefficient() {
		let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 5.0, 4.0, 5.0]).unwrap();

		assert!((r - 0.774_596_669).abs() < 1e-6, "Unexpected coefficient {r}");
	}

	#[test]
	fn degenerate_inputs_have_no_coefficient() {
		assert_eq!(pearson(&[1.0], &[1.0]), None);
		assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
		assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), None);
	}
}
