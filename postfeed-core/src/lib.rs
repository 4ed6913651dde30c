//! Core domain types for the Postfeed ranking engine.
//!
//! The ranking core consumes plain data: identifiers, timestamps, like counts
//! and tag-name sets. These types carry that data, validate what can be
//! validated cheaply (tag names), and define the [`FeedStore`] seam through
//! which like histories and candidate posts reach the ranker.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod ids;
pub mod post;
pub mod profile;
pub mod store;
pub mod tag;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use ids::{PostId, UserId};
pub use post::{Candidate, Like, Post};
pub use profile::TagWeightProfile;
pub use store::{FeedStore, MemoryFeedStore};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteFeedStore, SqliteFeedStoreError, create_feed_schema};
pub use tag::{MAX_TAG_NAME_LEN, TagName, TagNameError};
