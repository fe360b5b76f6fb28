use std::f64::consts::PI;

/// Compute the double factorial `n!! = n (n - 2) (n - 4) ...`, with
/// `0!! = 1!! = 1`.
pub fn double_factorial(n: usize) -> f64 {
    let mut result = 1.0;
    let mut k = n;
    while k > 1 {
        result *= k as f64;
        k -= 2;
    }
    return result;
}

/// Compute `Γ(n + 1/2)` for a non-negative integer `n`, using the exact
/// expression `Γ(n + 1/2) = (2n - 1)!! / 2^n √π`.
pub fn gamma_half_integer(n: usize) -> f64 {
    let double_factorial = if n == 0 { 1.0 } else { double_factorial(2 * n - 1) };
    return double_factorial / f64::powi(2.0, n as i32) * f64::sqrt(PI);
}
