//! Floating-point amount helpers.

/// Tolerance used for every "is this amount zero / equal" decision.
pub const AMOUNT_EPSILON: f64 = 1e-9;

/// Approximate equality with a relative tolerance of `AMOUNT_EPSILON`,
/// falling back to an absolute tolerance near zero.
pub fn approx_eq(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    diff <= AMOUNT_EPSILON || diff <= AMOUNT_EPSILON * a.abs().max(b.abs())
}

/// True when `amount` is meaningfully above zero.
pub fn is_positive(amount: f64) -> bool {
    amount > AMOUNT_EPSILON
}
