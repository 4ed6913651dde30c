//! Read-only access to like histories and feed candidates.
//!
//! The `FeedStore` trait is the seam between the ranking core and whatever
//! persists posts, tags and likes. The ranker never counts likes or resolves
//! tags itself; a store hands it plain data.

use crate::{Candidate, TagName, UserId};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryFeedStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteFeedStore, SqliteFeedStoreError, create_feed_schema};

/// Source of like histories and feed candidates.
///
/// Implementations must return a consistent snapshot for a single call. No
/// ordering is required of either method; the ranker imposes its own.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
///
/// use postfeed_core::{Candidate, FeedStore, TagName, UserId};
///
/// struct FixedStore {
///     liked: Vec<TagName>,
/// }
///
/// impl FeedStore for FixedStore {
///     type Error = Infallible;
///
///     fn liked_tags(&self, _user: UserId) -> Result<Vec<TagName>, Self::Error> {
///         Ok(self.liked.clone())
///     }
///
///     fn candidates_for(&self, _user: UserId) -> Result<Vec<Candidate>, Self::Error> {
///         Ok(Vec::new())
///     }
/// }
///
/// let store = FixedStore { liked: vec![TagName::new("django").unwrap()] };
/// assert_eq!(store.liked_tags(UserId::new(1)).unwrap().len(), 1);
/// ```
pub trait FeedStore {
    /// Error raised when the backing data cannot be read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return one tag name per (liked post, tag) pair for `user`.
    ///
    /// A tag appearing on several liked posts is returned once per post.
    ///
    /// # Errors
    /// Returns [`Self::Error`] when the backing data cannot be read.
    fn liked_tags(&self, user: UserId) -> Result<Vec<TagName>, Self::Error>;

    /// Return every post not authored by `user`, annotated with its like
    /// count and tags.
    ///
    /// # Errors
    /// Returns [`Self::Error`] when the backing data cannot be read.
    fn candidates_for(&self, user: UserId) -> Result<Vec<Candidate>, Self::Error>;
}
