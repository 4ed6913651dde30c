//! Tag affinity between a user's interests and a post.

use std::collections::BTreeSet;

use postfeed_core::{FeedStore, TagName, TagWeightProfile, UserId};

/// Mean profile weight over a post's distinct tags.
///
/// Posts without tags score `0.0`, as do tags the user never encountered.
/// The result lies in `0.0..=1.0`.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
///
/// use postfeed_core::{TagName, TagWeightProfile};
/// use postfeed_scorer::affinity;
///
/// let django = TagName::new("django").unwrap();
/// let python = TagName::new("python").unwrap();
/// let profile = TagWeightProfile::from_occurrences([django.clone()]);
/// let tags: BTreeSet<_> = [django, python].into_iter().collect();
/// assert_eq!(affinity(&profile, &tags), 0.5);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "affinity is an arithmetic mean of weights"
)]
pub fn affinity(profile: &TagWeightProfile, tags: &BTreeSet<TagName>) -> f64 {
    if tags.is_empty() || profile.is_empty() {
        return 0.0;
    }
    let total: f64 = tags.iter().map(|tag| profile.weight(tag.as_str())).sum();
    total / tags.len() as f64
}

/// Build the tag-weight profile for `user` from their like history.
///
/// # Errors
/// Propagates the store's error when the like history cannot be read.
pub fn user_tag_profile<S>(store: &S, user: UserId) -> Result<TagWeightProfile, S::Error>
where
    S: FeedStore + ?Sized,
{
    let occurrences = store.liked_tags(user)?;
    let profile = TagWeightProfile::from_occurrences(occurrences);
    log::debug!("user {user} has {} distinct liked tags", profile.len());
    Ok(profile)
}
