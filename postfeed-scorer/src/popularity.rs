//! Log-compressed popularity from like counts.

/// Popularity score `ln(1 + like_count)`.
///
/// Non-negative, increasing and strictly concave: each extra like is worth
/// less than the previous one.
///
/// # Examples
/// ```
/// use postfeed_scorer::popularity;
///
/// assert_eq!(popularity(0), 0.0);
/// assert!((popularity(2) - 3.0_f64.ln()).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "like counts beyond 2^53 lose precision harmlessly"
)]
pub fn popularity(like_count: u64) -> f64 {
    (like_count as f64).ln_1p()
}
