//! Feed assembly: rank the whole candidate set, then slice one page.

use chrono::{DateTime, Utc};
use postfeed_core::{FeedStore, UserId};

use crate::{Ranker, ScoredPost};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: usize = 20;
/// Largest page a caller may request.
pub const MAX_LIMIT: usize = 100;

/// Offset and limit of a feed page.
///
/// The limit is always within `1..=MAX_LIMIT`.
///
/// # Examples
/// ```
/// use postfeed_scorer::Pagination;
///
/// assert_eq!(Pagination::new(0, 0).limit(), 1);
/// assert_eq!(Pagination::new(0, 500).limit(), 100);
/// assert_eq!(Pagination::default().limit(), 20);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pagination {
    offset: usize,
    limit: usize,
}

impl Pagination {
    /// Build a page request, clamping `limit` into `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Build a page request, substituting defaults for missing values.
    #[must_use]
    pub fn from_options(offset: Option<usize>, limit: Option<usize>) -> Self {
        Self::new(offset.unwrap_or(0), limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// Number of ranked entries skipped.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Maximum number of entries returned.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, DEFAULT_LIMIT)
    }
}

/// One page of a ranked feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    /// Size of the full ranked candidate set.
    pub count: usize,
    /// Ranked entries on this page.
    pub results: Vec<ScoredPost>,
}

/// Slice an already ranked feed.
#[must_use]
pub fn paginate(ranked: Vec<ScoredPost>, pagination: Pagination) -> FeedPage {
    let count = ranked.len();
    let results = ranked
        .into_iter()
        .skip(pagination.offset)
        .take(pagination.limit)
        .collect();
    FeedPage { count, results }
}

/// Rank every candidate `store` offers `user` and return the requested page.
///
/// # Errors
/// Propagates the store's error when candidates or likes cannot be read.
pub fn assemble_feed<S>(
    ranker: &Ranker,
    store: &S,
    user: UserId,
    pagination: Pagination,
    now: DateTime<Utc>,
) -> Result<FeedPage, S::Error>
where
    S: FeedStore + ?Sized,
{
    let candidates = store.candidates_for(user)?;
    let ranked = ranker.rank_for_user(store, user, candidates, now)?;
    let page = paginate(ranked, pagination);
    log::debug!(
        "feed for user {user}: {} of {} posts from offset {}",
        page.results.len(),
        page.count,
        pagination.offset
    );
    Ok(page)
}
