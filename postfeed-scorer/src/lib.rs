//! Feed ranking for Postfeed.
//!
//! Three signals are blended into one score per candidate post:
//! - **Recency**: `exp(-lambda * age_hours)`, exactly `1.0` for a post
//!   created at the ranking instant.
//! - **Popularity**: `ln(1 + like_count)`, so early likes matter most.
//! - **Affinity**: the mean weight of a post's tags in the viewer's
//!   [`TagWeightProfile`](postfeed_core::TagWeightProfile), built from the
//!   tags of every post they liked.
//!
//! A small bounded tie-break term derived from the like count is added
//! before the score is rounded to six decimals. Candidates are then ordered
//! by score, creation time and id, all descending, so the id settles any
//! tie that remains.
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, Utc};
//! use postfeed_core::{Like, MemoryFeedStore, Post, PostId, TagName, UserId};
//! use postfeed_scorer::{Pagination, Ranker, assemble_feed};
//!
//! let now = Utc::now();
//! let reader = UserId::new(1);
//! let author = UserId::new(2);
//! let django = TagName::new("django").unwrap();
//! let store = MemoryFeedStore::from_parts(
//!     [
//!         Post::new(PostId::new(1), author, now - Duration::hours(1))
//!             .with_tags([django.clone()]),
//!         Post::new(PostId::new(2), author, now - Duration::hours(1)),
//!     ],
//!     [Like::new(reader, PostId::new(1))],
//! );
//! let page = assemble_feed(&Ranker::default(), &store, reader, Pagination::default(), now)
//!     .unwrap();
//! assert_eq!(page.count, 2);
//! assert_eq!(page.results[0].post.id, PostId::new(1));
//! ```

#![forbid(unsafe_code)]

mod affinity;
mod config;
mod error;
mod feed;
mod popularity;
mod ranker;
mod recency;

pub use affinity::{affinity, user_tag_profile};
pub use config::{
    DEFAULT_RECENCY_LAMBDA, ENV_RECENCY_LAMBDA, ENV_WEIGHT_AFFINITY, ENV_WEIGHT_POPULARITY,
    ENV_WEIGHT_RECENCY, RankingConfig, ScoreWeights,
};
pub use error::RankingConfigError;
pub use feed::{DEFAULT_LIMIT, FeedPage, MAX_LIMIT, Pagination, assemble_feed, paginate};
pub use popularity::popularity;
pub use ranker::{
    Ranker, SCORE_DECIMALS, ScoreBreakdown, ScoredPost, TIE_BREAK_LIKE_SCALE, round_score,
    tie_break,
};
pub use recency::{age_hours, recency_decay};
