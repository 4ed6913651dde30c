//! SQLite-backed feed store reading posts, tags and likes.
//!
//! Timestamps are stored as RFC 3339 text. Identifiers are stored as SQLite
//! integers and must be non-negative.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

use crate::{Candidate, PostId, TagName, TagNameError, UserId};

use super::FeedStore;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY,
    author_id INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS post_tags (
    post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (post_id, tag_id)
);
CREATE TABLE IF NOT EXISTS likes (
    user_id INTEGER NOT NULL,
    post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, post_id)
);
CREATE INDEX IF NOT EXISTS likes_post_idx ON likes (post_id);
";

const LIKED_TAGS_SQL: &str = "SELECT tags.name
     FROM likes
     JOIN post_tags ON post_tags.post_id = likes.post_id
     JOIN tags ON tags.id = post_tags.tag_id
     WHERE likes.user_id = ?1";

const CANDIDATES_SQL: &str = "SELECT
        posts.id,
        posts.author_id,
        posts.created_at,
        (SELECT COUNT(*) FROM likes WHERE likes.post_id = posts.id) AS like_count
     FROM posts
     WHERE posts.author_id != ?1";

const CANDIDATE_TAGS_SQL: &str = "SELECT post_tags.post_id, tags.name
     FROM post_tags
     JOIN tags ON tags.id = post_tags.tag_id
     JOIN posts ON posts.id = post_tags.post_id
     WHERE posts.author_id != ?1";

/// Create the feed tables when they do not exist yet.
///
/// # Errors
/// Returns the underlying `rusqlite` error when a statement fails.
pub fn create_feed_schema(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(SCHEMA_SQL)
}

/// Error raised when reading feed data from SQLite.
#[derive(Debug, Error)]
pub enum SqliteFeedStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or executing a query failed.
    #[error("failed to {operation}: {source}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored identifier was negative.
    #[error("{column} value {raw} is outside the supported range")]
    IdOutOfRange {
        /// Column that held the value.
        column: &'static str,
        /// Raw value read from SQLite.
        raw: i64,
    },
    /// A user identifier cannot be represented as a SQLite integer.
    #[error("user id {user} cannot be stored as a SQLite integer")]
    UserIdOutOfRange {
        /// Identifier supplied by the caller.
        user: UserId,
    },
    /// A stored timestamp was not valid RFC 3339.
    #[error("post {post} has an invalid created_at value {raw:?}: {source}")]
    InvalidTimestamp {
        /// Identifier of the affected post.
        post: PostId,
        /// Raw text read from SQLite.
        raw: String,
        /// Parse failure from `chrono`.
        #[source]
        source: chrono::ParseError,
    },
    /// A stored tag name failed validation.
    #[error("stored tag name {raw:?} is invalid: {source}")]
    InvalidTagName {
        /// Raw text read from SQLite.
        raw: String,
        /// Validation failure.
        #[source]
        source: TagNameError,
    },
    /// A previous user of the connection panicked while holding it.
    #[error("SQLite connection lock was poisoned")]
    ConnectionPoisoned,
}

/// Read-only feed store backed by a SQLite database.
pub struct SqliteFeedStore {
    connection: Mutex<Connection>,
    location: Option<PathBuf>,
}

impl fmt::Debug for SqliteFeedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteFeedStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl SqliteFeedStore {
    /// Open a read-only store over the database at `path`.
    ///
    /// # Errors
    /// Returns [`SqliteFeedStoreError::OpenDatabase`] when SQLite cannot open
    /// the file.
    pub fn open<P>(path: P) -> Result<Self, SqliteFeedStoreError>
    where
        P: AsRef<Path>,
    {
        let database_path = path.as_ref();
        let connection =
            Connection::open_with_flags(database_path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
                |source| SqliteFeedStoreError::OpenDatabase {
                    path: database_path.to_path_buf(),
                    source,
                },
            )?;
        Ok(Self {
            connection: Mutex::new(connection),
            location: Some(database_path.to_path_buf()),
        })
    }

    /// Wrap an already-open connection, e.g. an in-memory database.
    #[must_use]
    pub const fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
            location: None,
        }
    }

    /// Location of the database file, when opened from disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteFeedStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteFeedStoreError::ConnectionPoisoned)
    }

    fn load_candidate_tags(
        connection: &Connection,
        user: i64,
    ) -> Result<BTreeMap<PostId, BTreeSet<TagName>>, SqliteFeedStoreError> {
        let mut statement =
            connection
                .prepare_cached(CANDIDATE_TAGS_SQL)
                .map_err(|source| SqliteFeedStoreError::Query {
                    operation: "prepare candidate tag lookup",
                    source,
                })?;
        let rows = statement
            .query_map([user], |row| {
                let post: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                Ok((post, name))
            })
            .map_err(|source| SqliteFeedStoreError::Query {
                operation: "query candidate tags",
                source,
            })?;

        let mut tags: BTreeMap<PostId, BTreeSet<TagName>> = BTreeMap::new();
        for row in rows {
            let (post_raw, name) = row.map_err(|source| SqliteFeedStoreError::Query {
                operation: "read candidate tag row",
                source,
            })?;
            let post = post_id(post_raw)?;
            tags.entry(post).or_default().insert(tag_name(name)?);
        }
        Ok(tags)
    }
}

impl FeedStore for SqliteFeedStore {
    type Error = SqliteFeedStoreError;

    fn liked_tags(&self, user: UserId) -> Result<Vec<TagName>, Self::Error> {
        let user_raw = user_param(user)?;
        let connection = self.lock()?;
        let mut statement =
            connection
                .prepare_cached(LIKED_TAGS_SQL)
                .map_err(|source| SqliteFeedStoreError::Query {
                    operation: "prepare liked tag lookup",
                    source,
                })?;
        let rows = statement
            .query_map([user_raw], |row| row.get::<_, String>(0))
            .map_err(|source| SqliteFeedStoreError::Query {
                operation: "query liked tags",
                source,
            })?;

        let mut liked = Vec::new();
        for row in rows {
            let name = row.map_err(|source| SqliteFeedStoreError::Query {
                operation: "read liked tag row",
                source,
            })?;
            liked.push(tag_name(name)?);
        }
        log::debug!("user {user} has {} liked tag occurrences", liked.len());
        Ok(liked)
    }

    fn candidates_for(&self, user: UserId) -> Result<Vec<Candidate>, Self::Error> {
        let user_raw = user_param(user)?;
        let connection = self.lock()?;
        let mut tags = Self::load_candidate_tags(&connection, user_raw)?;

        let mut statement =
            connection
                .prepare_cached(CANDIDATES_SQL)
                .map_err(|source| SqliteFeedStoreError::Query {
                    operation: "prepare candidate selection",
                    source,
                })?;
        let rows = statement
            .query_map([user_raw], |row| {
                let id: i64 = row.get(0)?;
                let author: i64 = row.get(1)?;
                let created_at: String = row.get(2)?;
                let like_count: i64 = row.get(3)?;
                Ok((id, author, created_at, like_count))
            })
            .map_err(|source| SqliteFeedStoreError::Query {
                operation: "query candidates",
                source,
            })?;

        let mut candidates = Vec::new();
        for row in rows {
            let (id_raw, author_raw, created_raw, like_raw) =
                row.map_err(|source| SqliteFeedStoreError::Query {
                    operation: "read candidate row",
                    source,
                })?;
            let id = post_id(id_raw)?;
            let author = UserId::new(non_negative("posts.author_id", author_raw)?);
            let like_count = non_negative("like_count", like_raw)?;
            let created_at = parse_timestamp(id, created_raw)?;
            let mut candidate = Candidate::new(id, created_at)
                .authored_by(author)
                .with_like_count(like_count);
            if let Some(post_tags) = tags.remove(&id) {
                candidate.tags = post_tags;
            }
            candidates.push(candidate);
        }
        log::debug!(
            "loaded {} feed candidates for user {user}",
            candidates.len()
        );
        Ok(candidates)
    }
}

fn user_param(user: UserId) -> Result<i64, SqliteFeedStoreError> {
    i64::try_from(user.get()).map_err(|_| SqliteFeedStoreError::UserIdOutOfRange { user })
}

fn non_negative(column: &'static str, raw: i64) -> Result<u64, SqliteFeedStoreError> {
    u64::try_from(raw).map_err(|_| SqliteFeedStoreError::IdOutOfRange { column, raw })
}

fn post_id(raw: i64) -> Result<PostId, SqliteFeedStoreError> {
    non_negative("posts.id", raw).map(PostId::new)
}

fn tag_name(raw: String) -> Result<TagName, SqliteFeedStoreError> {
    TagName::new(raw.as_str())
        .map_err(|source| SqliteFeedStoreError::InvalidTagName { raw, source })
}

fn parse_timestamp(post: PostId, raw: String) -> Result<DateTime<Utc>, SqliteFeedStoreError> {
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(source) => Err(SqliteFeedStoreError::InvalidTimestamp { post, raw, source }),
    }
}
