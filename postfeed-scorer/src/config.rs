//! Signal weights and decay rate for the ranker.
//!
//! Values come from the process environment (`WEIGHT_RECENCY`,
//! `WEIGHT_POPULARITY`, `WEIGHT_AFFINITY`, `RECENCY_LAMBDA`) or from any
//! lookup function, and are validated before a ranker can use them.
#![forbid(unsafe_code)]

use crate::RankingConfigError;

/// Environment variable holding the recency weight.
pub const ENV_WEIGHT_RECENCY: &str = "WEIGHT_RECENCY";
/// Environment variable holding the popularity weight.
pub const ENV_WEIGHT_POPULARITY: &str = "WEIGHT_POPULARITY";
/// Environment variable holding the affinity weight.
pub const ENV_WEIGHT_AFFINITY: &str = "WEIGHT_AFFINITY";
/// Environment variable holding the recency decay rate (per hour).
pub const ENV_RECENCY_LAMBDA: &str = "RECENCY_LAMBDA";

/// Decay rate used when none is configured.
pub const DEFAULT_RECENCY_LAMBDA: f64 = 0.05;

/// Relative weighting of the three ranking signals.
///
/// # Examples
/// ```
/// use postfeed_scorer::ScoreWeights;
///
/// let weights = ScoreWeights::default();
/// assert_eq!(weights, ScoreWeights::recency_dominant());
/// assert!(ScoreWeights::affinity_dominant().validate().is_ok());
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScoreWeights {
    /// Multiplier applied to the recency decay score.
    pub recency: f64,
    /// Multiplier applied to the log-compressed like count.
    pub popularity: f64,
    /// Multiplier applied to the tag affinity score.
    pub affinity: f64,
}

impl ScoreWeights {
    /// Preset favouring fresh posts: `0.5 / 0.2 / 0.3`.
    #[must_use]
    pub const fn recency_dominant() -> Self {
        Self {
            recency: 0.5,
            popularity: 0.2,
            affinity: 0.3,
        }
    }

    /// Preset favouring tag affinity over popularity: `3.0 / 0.8 / 1.2`.
    #[must_use]
    pub const fn affinity_dominant() -> Self {
        Self {
            recency: 3.0,
            popularity: 0.8,
            affinity: 1.2,
        }
    }

    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`RankingConfigError::InvalidWeight`] when a weight is
    /// negative or not finite, and [`RankingConfigError::ZeroTotalWeight`]
    /// when every weight is zero.
    pub fn validate(self) -> Result<Self, RankingConfigError> {
        for (name, value) in self.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(RankingConfigError::InvalidWeight { name, value });
            }
        }
        if self.named().iter().all(|(_, value)| *value == 0.0) {
            return Err(RankingConfigError::ZeroTotalWeight);
        }
        Ok(self)
    }

    const fn named(self) -> [(&'static str, f64); 3] {
        [
            (ENV_WEIGHT_RECENCY, self.recency),
            (ENV_WEIGHT_POPULARITY, self.popularity),
            (ENV_WEIGHT_AFFINITY, self.affinity),
        ]
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "score blending requires a weighted sum"
    )]
    pub(crate) const fn combine(self, recency: f64, popularity: f64, affinity: f64) -> f64 {
        self.recency * recency + self.popularity * popularity + self.affinity * affinity
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::recency_dominant()
    }
}

/// Complete ranking configuration: signal weights plus the decay rate.
///
/// # Examples
/// ```
/// use postfeed_scorer::{RankingConfig, ScoreWeights};
///
/// let config = RankingConfig::from_lookup(|name| match name {
///     "WEIGHT_AFFINITY" => Some("0.9".to_owned()),
///     _ => None,
/// })
/// .expect("valid configuration");
/// assert_eq!(config.weights.affinity, 0.9);
/// assert_eq!(config.weights.recency, ScoreWeights::default().recency);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RankingConfig {
    /// Signal weights.
    pub weights: ScoreWeights,
    /// Recency decay rate per hour of age.
    pub recency_lambda: f64,
}

impl RankingConfig {
    /// Construct a configuration without validating it.
    #[must_use]
    pub const fn new(weights: ScoreWeights, recency_lambda: f64) -> Self {
        Self {
            weights,
            recency_lambda,
        }
    }

    /// Validate the configuration and return a copy.
    ///
    /// # Errors
    /// Propagates [`ScoreWeights::validate`] failures and returns
    /// [`RankingConfigError::InvalidRecencyLambda`] for a negative or
    /// non-finite decay rate.
    pub fn validate(self) -> Result<Self, RankingConfigError> {
        self.weights.validate()?;
        if !self.recency_lambda.is_finite() || self.recency_lambda < 0.0 {
            return Err(RankingConfigError::InvalidRecencyLambda {
                value: self.recency_lambda,
            });
        }
        Ok(self)
    }

    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    /// See [`RankingConfig::from_lookup`].
    pub fn from_env() -> Result<Self, RankingConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load and validate configuration through `lookup`.
    ///
    /// Unset or blank variables fall back to their defaults; every value is
    /// overridable independently.
    ///
    /// # Errors
    /// Returns [`RankingConfigError::Parse`] for values that are not numbers
    /// and any error raised by [`RankingConfig::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RankingConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let weights = ScoreWeights {
            recency: read_value(&lookup, ENV_WEIGHT_RECENCY, defaults.weights.recency)?,
            popularity: read_value(&lookup, ENV_WEIGHT_POPULARITY, defaults.weights.popularity)?,
            affinity: read_value(&lookup, ENV_WEIGHT_AFFINITY, defaults.weights.affinity)?,
        };
        let recency_lambda = read_value(&lookup, ENV_RECENCY_LAMBDA, defaults.recency_lambda)?;
        Self::new(weights, recency_lambda).validate()
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self::new(ScoreWeights::default(), DEFAULT_RECENCY_LAMBDA)
    }
}

fn read_value<F>(lookup: &F, name: &'static str, default: f64) -> Result<f64, RankingConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse::<f64>()
        .map_err(|source| RankingConfigError::Parse { name, raw, source })
}

#[cfg(test)]
mod tests {
    //! Unit coverage for configuration loading and validation.

    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[rstest]
    fn empty_environment_yields_defaults() {
        let config = RankingConfig::from_lookup(|_| None).expect("defaults are valid");
        assert_eq!(config, RankingConfig::default());
        assert_eq!(config.recency_lambda, 0.05);
        assert_eq!(config.weights, ScoreWeights::recency_dominant());
    }

    #[rstest]
    fn each_value_is_independently_overridable() {
        let config = RankingConfig::from_lookup(lookup_from(&[
            ("WEIGHT_POPULARITY", "0.8"),
            ("RECENCY_LAMBDA", " 0.1 "),
        ]))
        .expect("valid overrides");
        assert_eq!(config.weights.popularity, 0.8);
        assert_eq!(config.weights.recency, 0.5);
        assert_eq!(config.weights.affinity, 0.3);
        assert_eq!(config.recency_lambda, 0.1);
    }

    #[rstest]
    fn blank_values_fall_back_to_defaults() {
        let config = RankingConfig::from_lookup(lookup_from(&[("WEIGHT_AFFINITY", "  ")]))
            .expect("blank is treated as unset");
        assert_eq!(config.weights.affinity, 0.3);
    }

    #[rstest]
    fn unparseable_values_name_the_variable() {
        let err = RankingConfig::from_lookup(lookup_from(&[("WEIGHT_RECENCY", "heavy")]))
            .expect_err("non-numeric weight should fail");
        assert!(matches!(
            err,
            RankingConfigError::Parse { name: "WEIGHT_RECENCY", ref raw, .. } if raw == "heavy"
        ));
    }

    #[rstest]
    #[case("WEIGHT_RECENCY", "-0.1")]
    #[case("WEIGHT_POPULARITY", "inf")]
    #[case("WEIGHT_AFFINITY", "NaN")]
    fn invalid_weights_fail_fast(#[case] name: &str, #[case] raw: &str) {
        let err = RankingConfig::from_lookup(lookup_from(&[(name, raw)]))
            .expect_err("invalid weight should fail");
        assert!(matches!(err, RankingConfigError::InvalidWeight { name: found, .. } if found == name));
    }

    #[rstest]
    #[case("-0.05")]
    #[case("inf")]
    fn invalid_lambda_fails_fast(#[case] raw: &str) {
        let err = RankingConfig::from_lookup(lookup_from(&[("RECENCY_LAMBDA", raw)]))
            .expect_err("invalid lambda should fail");
        assert!(matches!(err, RankingConfigError::InvalidRecencyLambda { .. }));
    }

    #[rstest]
    fn zero_lambda_is_allowed() {
        let config = RankingConfig::new(ScoreWeights::default(), 0.0);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn all_zero_weights_are_rejected() {
        let err = ScoreWeights {
            recency: 0.0,
            popularity: 0.0,
            affinity: 0.0,
        }
        .validate()
        .expect_err("zero weights should be invalid");
        assert_eq!(err, RankingConfigError::ZeroTotalWeight);
    }

    #[rstest]
    fn presets_are_valid() {
        assert!(ScoreWeights::recency_dominant().validate().is_ok());
        assert!(ScoreWeights::affinity_dominant().validate().is_ok());
    }

    #[rstest]
    #[expect(
        clippy::float_arithmetic,
        reason = "tests compare floating point values"
    )]
    fn combine_is_a_weighted_sum() {
        let weights = ScoreWeights::recency_dominant();
        let combined = weights.combine(1.0, 2.0, 0.5);
        assert!((combined - (0.5 + 0.4 + 0.15)).abs() < 1e-12);
    }
}
