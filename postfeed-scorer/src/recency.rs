//! Exponential time decay of a post's freshness.

use chrono::{DateTime, Utc};

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Fractional hours elapsed between `created_at` and `now`.
///
/// Negative when the post claims to be from the future.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "ages are converted to fractional hours"
)]
pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(created_at);
    elapsed.num_microseconds().map_or_else(
        || elapsed.num_milliseconds() as f64 / MILLIS_PER_HOUR,
        |micros| micros as f64 / MICROS_PER_HOUR,
    )
}

/// Recency score `exp(-lambda * age_hours)`.
///
/// A post created at `now` scores exactly `1.0`; older posts decay towards
/// zero. Future timestamps score above `1.0` and are accepted.
///
/// # Examples
/// ```
/// use chrono::{Duration, Utc};
/// use postfeed_scorer::recency_decay;
///
/// let now = Utc::now();
/// assert_eq!(recency_decay(now, now, 0.05), 1.0);
/// let day_old = recency_decay(now - Duration::hours(24), now, 0.05);
/// assert!((day_old - (-1.2_f64).exp()).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "exponential decay is computed in floating point"
)]
pub fn recency_decay(created_at: DateTime<Utc>, now: DateTime<Utc>, lambda: f64) -> f64 {
    let age = age_hours(created_at, now);
    if age < 0.0 {
        log::debug!("post created {:.3} hours in the future of the ranking instant", -age);
    }
    (-lambda * age).exp()
}
