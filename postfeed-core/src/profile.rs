//! Tag-weight profiles: a user's inferred interests as a distribution over
//! tag names.
//!
//! A profile is built from every tag occurrence across the posts a user has
//! liked. Weights are occurrence counts divided by the total, so a non-empty
//! profile sums to `1.0`. Lookups for unknown tags return `0.0`.

use std::collections::BTreeMap;

use crate::TagName;

/// Normalised tag interests for one user.
///
/// # Examples
/// ```
/// use postfeed_core::{TagName, TagWeightProfile};
///
/// let django = TagName::new("django").unwrap();
/// let python = TagName::new("python").unwrap();
/// let profile =
///     TagWeightProfile::from_occurrences([django.clone(), django, python]);
/// assert!((profile.weight("django") - 2.0 / 3.0).abs() < 1e-12);
/// assert_eq!(profile.weight("rust"), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagWeightProfile {
    weights: BTreeMap<TagName, f64>,
}

impl TagWeightProfile {
    /// Construct an empty profile: every lookup yields `0.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a profile from tag occurrences, one item per (liked post, tag).
    ///
    /// The denominator is clamped to `1` so an empty input yields an empty
    /// profile rather than dividing by zero.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "normalising occurrence counts into weights needs float division"
    )]
    pub fn from_occurrences<I>(occurrences: I) -> Self
    where
        I: IntoIterator<Item = TagName>,
    {
        let mut counts: BTreeMap<TagName, u64> = BTreeMap::new();
        for tag in occurrences {
            *counts.entry(tag).or_default() += 1;
        }
        let total = counts.values().sum::<u64>().max(1) as f64;
        let weights = counts
            .into_iter()
            .map(|(tag, count)| (tag, count as f64 / total))
            .collect();
        Self { weights }
    }

    /// Return the weight for a tag name, or `0.0` when absent.
    #[must_use]
    pub fn weight(&self, tag: &str) -> f64 {
        self.weights.get(tag).copied().unwrap_or(0.0)
    }

    /// Return the weight for a tag name, if the user has encountered it.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<f64> {
        self.weights.get(tag).copied()
    }

    /// Number of distinct tags in the profile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Report whether the user has no tag interests at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterate over `(tag, weight)` pairs in tag-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&TagName, f64)> {
        self.weights.iter().map(|(tag, weight)| (tag, *weight))
    }

    /// Sum of all weights: `1.0` (within rounding) or `0.0` when empty.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-12;

    fn tags(names: &[&str]) -> Vec<TagName> {
        names
            .iter()
            .map(|name| TagName::new(*name).expect("valid tag"))
            .collect()
    }

    #[rstest]
    fn empty_history_yields_empty_profile() {
        let profile = TagWeightProfile::from_occurrences(Vec::new());
        assert!(profile.is_empty());
        assert_eq!(profile.weight("django"), 0.0);
        assert_eq!(profile.total_weight(), 0.0);
    }

    #[rstest]
    #[case(&["django"], "django", 1.0)]
    #[case(&["django", "python"], "django", 0.5)]
    #[case(&["django", "django", "python", "rust"], "django", 0.5)]
    #[case(&["django", "django", "python", "rust"], "rust", 0.25)]
    #[case(&["django"], "python", 0.0)]
    fn weights_are_occurrence_shares(
        #[case] occurrences: &[&str],
        #[case] tag: &str,
        #[case] expected: f64,
    ) {
        let profile = TagWeightProfile::from_occurrences(tags(occurrences));
        assert!((profile.weight(tag) - expected).abs() < TOLERANCE);
    }

    #[rstest]
    fn weights_sum_to_one() {
        let profile =
            TagWeightProfile::from_occurrences(tags(&["a", "b", "b", "c", "c", "c", "d"]));
        assert!((profile.total_weight() - 1.0).abs() < TOLERANCE);
        assert_eq!(profile.len(), 4);
    }

    #[rstest]
    fn absent_tags_report_none() {
        let profile = TagWeightProfile::from_occurrences(tags(&["django"]));
        assert_eq!(profile.get("python"), None);
        assert_eq!(profile.get("django"), Some(1.0));
    }
}
