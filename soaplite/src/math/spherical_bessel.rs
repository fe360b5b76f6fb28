/// Compute the exponentially scaled modified spherical Bessel functions of
/// the first kind, `e^{-x} i_l(x)` for all `0 <= l < values.len()`, and store
/// them in `values`.
///
/// The scaling keeps the values finite for large arguments, where `i_l(x)`
/// grows as `e^x / 2x`. `x` must be non-negative.
pub fn scaled_modified_spherical_bessel(x: f64, values: &mut [f64]) {
    debug_assert!(x >= 0.0, "x must be positive in scaled_modified_spherical_bessel");
    if values.is_empty() {
        return;
    }

    let max_angular = values.len() - 1;
    if x <= f64::max(max_angular as f64, 10.0) {
        for (l, value) in values.iter_mut().enumerate() {
            *value = power_series(l, x);
        }
    } else {
        upward_recurrence(x, values);
    }
}

/// Power series `i_l(x) = x^l Σ_k (x^2 / 2)^k / (k! (2l + 2k + 1)!!)`, only
/// converging quickly for small `x`.
fn power_series(l: usize, x: f64) -> f64 {
    let half_x2 = 0.5 * x * x;

    let mut term = 1.0;
    for i in 1..=l {
        term *= x / (2 * i + 1) as f64;
    }

    let mut sum = term;
    let mut k = 0;
    while term > f64::EPSILON * 1e-2 * sum && k < 500 {
        term *= half_x2 / ((k + 1) * (2 * l + 2 * k + 3)) as f64;
        sum += term;
        k += 1;
    }

    return sum * f64::exp(-x);
}

/// Recurrence `i_{l+1}(x) = i_{l-1}(x) - (2l + 1) / x i_l(x)`, which is
/// numerically stable as long as `l < x`.
fn upward_recurrence(x: f64, values: &mut [f64]) {
    let exp_m2x = f64::exp(-2.0 * x);
    values[0] = -f64::exp_m1(-2.0 * x) / (2.0 * x);
    if values.len() == 1 {
        return;
    }

    values[1] = (0.5 * (1.0 + exp_m2x) - values[0]) / x;
    for l in 1..(values.len() - 1) {
        values[l + 1] = values[l - 1] - (2 * l + 1) as f64 / x * values[l];
    }
}
