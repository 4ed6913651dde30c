//! Facade crate for the Postfeed ranking engine.
//!
//! This crate re-exports the core domain types and exposes the ranker and the
//! `SQLite` feed store behind feature flags.
//!
//! ```
//! # #[cfg(feature = "scorer")]
//! # {
//! use chrono::{TimeZone, Utc};
//! use postfeed::{
//!     MemoryFeedStore, Pagination, Post, PostId, Ranker, RankingConfig, UserId, assemble_feed,
//! };
//!
//! let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
//! let store = MemoryFeedStore::from_parts([Post::new(PostId::new(1), UserId::new(2), now)], []);
//! let ranker = Ranker::new(RankingConfig::default()).unwrap();
//! let page = assemble_feed(&ranker, &store, UserId::new(1), Pagination::default(), now)
//!     .unwrap();
//! assert_eq!(page.count, 1);
//! # }
//! ```

#![forbid(unsafe_code)]

pub use postfeed_core::{
    Candidate, FeedStore, Like, MemoryFeedStore, Post, PostId, TagName, TagNameError,
    TagWeightProfile, UserId,
};

#[cfg(feature = "store-sqlite")]
pub use postfeed_core::{SqliteFeedStore, SqliteFeedStoreError};

#[cfg(feature = "scorer")]
pub use postfeed_scorer::{
    FeedPage, Pagination, Ranker, RankingConfig, RankingConfigError, ScoreBreakdown, ScoreWeights,
    ScoredPost, assemble_feed,
};
