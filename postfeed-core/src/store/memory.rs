//! In-memory feed store for snapshots, embedding and tests.

use std::{
    collections::{BTreeMap, BTreeSet},
    convert::Infallible,
};

use crate::{Candidate, Like, Post, PostId, TagName, UserId};

use super::FeedStore;

/// Feed store holding posts and likes in ordered maps.
///
/// Likes behave like a unique `(user, post)` association: liking twice is a
/// no-op. Likes that reference posts the store does not hold are kept but
/// contribute neither tags nor like counts.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use postfeed_core::{FeedStore, Like, MemoryFeedStore, Post, PostId, TagName, UserId};
///
/// let reader = UserId::new(1);
/// let author = UserId::new(2);
/// let mut store = MemoryFeedStore::new();
/// store.insert_post(
///     Post::new(PostId::new(10), author, Utc::now())
///         .with_tags([TagName::new("django").unwrap()]),
/// );
/// assert!(store.like(Like::new(reader, PostId::new(10))));
/// assert!(!store.like(Like::new(reader, PostId::new(10))));
///
/// let candidates = store.candidates_for(reader).unwrap();
/// assert_eq!(candidates[0].like_count, 1);
/// assert!(store.candidates_for(author).unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFeedStore {
    posts: BTreeMap<PostId, Post>,
    likes: BTreeSet<(UserId, PostId)>,
}

impl MemoryFeedStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from posts and likes, applying likes idempotently.
    #[must_use]
    pub fn from_parts<P, L>(posts: P, likes: L) -> Self
    where
        P: IntoIterator<Item = Post>,
        L: IntoIterator<Item = Like>,
    {
        let mut store = Self::new();
        for post in posts {
            store.insert_post(post);
        }
        for like in likes {
            store.like(like);
        }
        store
    }

    /// Insert or replace a post, returning the previous version if any.
    pub fn insert_post(&mut self, post: Post) -> Option<Post> {
        self.posts.insert(post.id, post)
    }

    /// Report whether a post with `id` is present.
    #[must_use]
    pub fn contains_post(&self, id: PostId) -> bool {
        self.posts.contains_key(&id)
    }

    /// Record a like, returning `true` when it did not exist yet.
    pub fn like(&mut self, like: Like) -> bool {
        self.likes.insert((like.user, like.post))
    }

    /// Remove a like, returning `true` when it existed.
    pub fn unlike(&mut self, like: Like) -> bool {
        self.likes.remove(&(like.user, like.post))
    }

    /// Count likes that reference `post`.
    #[must_use]
    pub fn like_count(&self, post: PostId) -> u64 {
        let count = self
            .likes
            .iter()
            .filter(|(_, liked)| *liked == post)
            .count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    /// Iterate over the posts `user` has liked that the store holds.
    pub fn liked_posts(&self, user: UserId) -> impl Iterator<Item = &Post> + '_ {
        self.likes
            .range((user, PostId::MIN)..=(user, PostId::MAX))
            .filter_map(|(_, post)| self.posts.get(post))
    }

    /// Tally likes per post in a single pass over the like set.
    fn like_counts(&self) -> BTreeMap<PostId, u64> {
        let mut counts = BTreeMap::new();
        for (_, post) in &self.likes {
            counts
                .entry(*post)
                .and_modify(|count: &mut u64| *count = count.saturating_add(1))
                .or_insert(1);
        }
        counts
    }

    /// Number of stored posts.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

impl FeedStore for MemoryFeedStore {
    type Error = Infallible;

    fn liked_tags(&self, user: UserId) -> Result<Vec<TagName>, Self::Error> {
        Ok(self
            .liked_posts(user)
            .flat_map(|post| post.tags.iter().cloned())
            .collect())
    }

    fn candidates_for(&self, user: UserId) -> Result<Vec<Candidate>, Self::Error> {
        let counts = self.like_counts();
        Ok(self
            .posts
            .values()
            .filter(|post| post.author != user)
            .map(|post| {
                let like_count = counts.get(&post.id).copied().unwrap_or(0);
                Candidate::from_post(post.clone(), like_count)
            })
            .collect())
    }
}
