//! Test-only helpers for building candidates relative to a fixed instant.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{Candidate, PostId, TagName};

/// Fixed "now" shared by tests so ages are reproducible.
#[must_use]
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse tag names, skipping any that fail validation.
#[must_use]
pub fn tag_names(names: &[&str]) -> Vec<TagName> {
    names
        .iter()
        .filter_map(|name| TagName::new(*name).ok())
        .collect()
}

/// Build a candidate created `age` before `now`.
#[must_use]
pub fn candidate_aged(
    id: u64,
    now: DateTime<Utc>,
    age: Duration,
    tags: &[&str],
    like_count: u64,
) -> Candidate {
    Candidate::new(PostId::new(id), now - age)
        .with_tags(tag_names(tags))
        .with_like_count(like_count)
}
