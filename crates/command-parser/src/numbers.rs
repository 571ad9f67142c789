//! Score normalisation helpers

/// Shifts every value up so the minimum is at least `floor`.
pub fn boost(values: &mut [f64], floor: f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if min < floor {
        let shift = floor - min;
        values.iter_mut().for_each(|v| *v += shift);
    }
}

/// Boosts to `floor`, then scales to sum to 1. An all-zero list stays zero.
pub fn normalize(values: &mut [f64], floor: f64) {
    boost(values, floor);
    let sum: f64 = values.iter().sum();
    if sum == 0.0 {
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    values.iter_mut().for_each(|v| *v /= sum);
}

/// Maps values into (0, 1] as `(v / max)^exp`, so near-maximal values stay
/// high and partial ones decay fast. If the maximum is zero every value
/// becomes `1 / len`.
pub fn make_prob(values: &mut [f64], exp: f64) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == 0.0 {
        let uniform = 1.0 / values.len() as f64;
        values.iter_mut().for_each(|v| *v = uniform);
        return;
    }
    values.iter_mut().for_each(|v| *v = (*v / max).powf(exp));
}
