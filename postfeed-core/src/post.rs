//! Posts, likes and the ranking view of a post.
//!
//! [`Post`] is the stored entity as a feed store sees it. [`Candidate`] is
//! the read-only view handed to the ranker: the same post annotated with a
//! like count the caller aggregated beforehand.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{PostId, TagName, UserId};

/// A post as persisted by a feed store.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use postfeed_core::{Post, PostId, TagName, UserId};
///
/// let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let post = Post::new(PostId::new(1), UserId::new(2), created)
///     .with_tags([TagName::new("rust").unwrap()]);
/// assert_eq!(post.tags.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Post {
    /// Unique identifier.
    pub id: PostId,
    /// User who wrote the post.
    pub author: UserId,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Distinct tag names attached to the post.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: BTreeSet<TagName>,
}

impl Post {
    /// Construct an untagged post.
    #[must_use]
    pub const fn new(id: PostId, author: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author,
            created_at,
            tags: BTreeSet::new(),
        }
    }

    /// Attach tags while returning `self` for chaining. Duplicates collapse.
    #[must_use]
    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = TagName>,
    {
        self.tags.extend(tags);
        self
    }
}

/// A post eligible for ranking, annotated with its like count.
///
/// The like count must equal the number of likes referencing the post. The
/// ranker trusts it and never recounts.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use postfeed_core::{Candidate, PostId, TagName};
///
/// let candidate = Candidate::new(PostId::new(3), Utc::now())
///     .with_tags([TagName::new("python").unwrap()])
///     .with_like_count(4);
/// assert_eq!(candidate.like_count, 4);
/// assert!(candidate.author.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// Post identifier; the final ranking tie-break.
    pub id: PostId,
    /// Author, when the source knows it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub author: Option<UserId>,
    /// Creation instant; drives recency and the secondary tie-break.
    pub created_at: DateTime<Utc>,
    /// Distinct tag names attached to the post.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: BTreeSet<TagName>,
    /// Number of likes referencing the post.
    #[cfg_attr(feature = "serde", serde(default))]
    pub like_count: u64,
}

impl Candidate {
    /// Construct an untagged, unliked candidate with no known author.
    #[must_use]
    pub const fn new(id: PostId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author: None,
            created_at,
            tags: BTreeSet::new(),
            like_count: 0,
        }
    }

    /// Build the ranking view of a stored post.
    #[must_use]
    pub fn from_post(post: Post, like_count: u64) -> Self {
        Self {
            id: post.id,
            author: Some(post.author),
            created_at: post.created_at,
            tags: post.tags,
            like_count,
        }
    }

    /// Attach tags while returning `self` for chaining. Duplicates collapse.
    #[must_use]
    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = TagName>,
    {
        self.tags.extend(tags);
        self
    }

    /// Set the like count while returning `self` for chaining.
    #[must_use]
    pub const fn with_like_count(mut self, like_count: u64) -> Self {
        self.like_count = like_count;
        self
    }

    /// Record the author while returning `self` for chaining.
    #[must_use]
    pub const fn authored_by(mut self, author: UserId) -> Self {
        self.author = Some(author);
        self
    }
}

/// A user's like of a post. At most one like exists per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Like {
    /// User who liked the post.
    pub user: UserId,
    /// Post that was liked.
    pub post: PostId,
}

impl Like {
    /// Construct a like.
    #[must_use]
    pub const fn new(user: UserId, post: PostId) -> Self {
        Self { user, post }
    }
}
