//! Blend the three signals into a single score and order candidates.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use postfeed_core::{Candidate, FeedStore, TagWeightProfile, UserId};

use crate::{RankingConfig, RankingConfigError, affinity, popularity, recency_decay, user_tag_profile};

/// Upper bound of the like-count tie-break term.
pub const TIE_BREAK_LIKE_SCALE: f64 = 1e-4;
/// Fractional digits kept in published scores.
pub const SCORE_DECIMALS: i32 = 6;

const SCORE_QUANTUM: f64 = 1e6;

/// Unweighted signal values behind a score.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScoreBreakdown {
    /// Recency decay in `(0, 1]` for past posts.
    pub recency: f64,
    /// `ln(1 + like_count)`.
    pub popularity: f64,
    /// Mean tag affinity in `[0, 1]`.
    pub affinity: f64,
    /// Deterministic like-count tie-break term, below `1e-4`.
    pub tie_break: f64,
}

/// A candidate together with its published score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPost {
    /// The ranked candidate.
    pub post: Candidate,
    /// Final score rounded to [`SCORE_DECIMALS`] digits.
    pub score: f64,
    /// Signals the score was derived from.
    pub breakdown: ScoreBreakdown,
}

/// Scores and orders feed candidates for one user.
///
/// The ranker is stateless apart from its validated configuration, so one
/// instance can serve any number of concurrent ranking calls.
///
/// # Examples
/// ```
/// use chrono::{Duration, Utc};
/// use postfeed_core::{Candidate, PostId, TagName, TagWeightProfile};
/// use postfeed_scorer::Ranker;
///
/// let now = Utc::now();
/// let django = TagName::new("django").unwrap();
/// let profile = TagWeightProfile::from_occurrences([django.clone()]);
/// let fresh = Candidate::new(PostId::new(1), now).with_tags([django]);
/// let stale = Candidate::new(PostId::new(2), now - Duration::days(3));
///
/// let ranked = Ranker::default().rank(&profile, [stale, fresh], now);
/// assert_eq!(ranked[0].post.id, PostId::new(1));
/// assert!(ranked[0].score > ranked[1].score);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    /// Build a ranker from a configuration, validating it first.
    ///
    /// # Errors
    /// Returns [`RankingConfigError`] when the configuration is invalid.
    pub fn new(config: RankingConfig) -> Result<Self, RankingConfigError> {
        config.validate().map(|config| Self { config })
    }

    /// Build a ranker from the `WEIGHT_*` and `RECENCY_LAMBDA` environment.
    ///
    /// # Errors
    /// Returns [`RankingConfigError`] when a value is malformed or invalid.
    pub fn from_env() -> Result<Self, RankingConfigError> {
        RankingConfig::from_env().map(|config| Self { config })
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Compute the signal values for one candidate.
    #[must_use]
    pub fn breakdown(
        &self,
        profile: &TagWeightProfile,
        candidate: &Candidate,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        ScoreBreakdown {
            recency: finite_or_zero(recency_decay(
                candidate.created_at,
                now,
                self.config.recency_lambda,
            )),
            popularity: finite_or_zero(popularity(candidate.like_count)),
            affinity: finite_or_zero(affinity(profile, &candidate.tags)),
            tie_break: tie_break(candidate.like_count),
        }
    }

    /// Final rounded score for one candidate.
    #[must_use]
    pub fn score(
        &self,
        profile: &TagWeightProfile,
        candidate: &Candidate,
        now: DateTime<Utc>,
    ) -> f64 {
        self.published_score(&self.breakdown(profile, candidate, now))
    }

    /// Score every candidate against `profile` and order them.
    ///
    /// Results are sorted descending by score, then by creation time, then
    /// by identifier, so equal scores favour newer and later posts.
    #[must_use]
    pub fn rank<I>(
        &self,
        profile: &TagWeightProfile,
        candidates: I,
        now: DateTime<Utc>,
    ) -> Vec<ScoredPost>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut ranked: Vec<ScoredPost> = candidates
            .into_iter()
            .map(|post| {
                let breakdown = self.breakdown(profile, &post, now);
                ScoredPost {
                    score: self.published_score(&breakdown),
                    post,
                    breakdown,
                }
            })
            .collect();
        ranked.sort_by(compare_ranked);
        log::debug!(
            "ranked {} candidates against {} profile tags",
            ranked.len(),
            profile.len()
        );
        ranked
    }

    /// Build `user`'s profile from `store` once, then rank `candidates`.
    ///
    /// # Errors
    /// Propagates the store's error when the like history cannot be read.
    pub fn rank_for_user<S, I>(
        &self,
        store: &S,
        user: UserId,
        candidates: I,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredPost>, S::Error>
    where
        S: FeedStore + ?Sized,
        I: IntoIterator<Item = Candidate>,
    {
        let profile = user_tag_profile(store, user)?;
        Ok(self.rank(&profile, candidates, now))
    }

    #[expect(clippy::float_arithmetic, reason = "tie-break is added to the blend")]
    fn published_score(&self, breakdown: &ScoreBreakdown) -> f64 {
        let primary = finite_or_zero(self.config.weights.combine(
            breakdown.recency,
            breakdown.popularity,
            breakdown.affinity,
        ));
        round_score(primary + breakdown.tie_break)
    }
}

/// Deterministic tie-break term derived from the like count.
///
/// The term saturates below [`TIE_BREAK_LIKE_SCALE`] and increases with the
/// like count. Identifiers take no part in the score; [`Ranker::rank`] orders
/// exact score ties by creation time and then by id.
///
/// # Examples
/// ```
/// use postfeed_scorer::{TIE_BREAK_LIKE_SCALE, tie_break};
///
/// assert_eq!(tie_break(0), 0.0);
/// assert!(tie_break(3) > tie_break(2));
/// assert!(tie_break(u64::MAX) <= TIE_BREAK_LIKE_SCALE);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "the tie-break is a bounded float ratio"
)]
pub const fn tie_break(like_count: u64) -> f64 {
    let likes = like_count as f64;
    TIE_BREAK_LIKE_SCALE * (likes / (likes + 1.0))
}

/// Round a score to [`SCORE_DECIMALS`] fractional digits.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "decimal rounding")]
pub fn round_score(score: f64) -> f64 {
    (score * SCORE_QUANTUM).round() / SCORE_QUANTUM
}

const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub(crate) fn compare_ranked(left: &ScoredPost, right: &ScoredPost) -> Ordering {
    right
        .score
        .total_cmp(&left.score)
        .then_with(|| right.post.created_at.cmp(&left.post.created_at))
        .then_with(|| right.post.id.cmp(&left.post.id))
}
