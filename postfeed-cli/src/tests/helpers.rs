//! Fixtures shared by the feed command tests.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::json;
use tempfile::TempDir;

/// Ranking instant every fixture is dated against.
pub(super) const REFERENCE_NOW: &str = "2024-06-01T12:00:00Z";
/// The user whose feed is ranked.
pub(super) const READER: u64 = 1;

/// Ids in the order the default weights rank them for [`READER`].
pub(super) const DEFAULT_ORDER: [u64; 4] = [1, 3, 10, 2];

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// Temporary directory with a UTF-8 root path.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }
}

/// Snapshot with a liked django post (10), a fresh django post (1), a stale
/// python post (2), a popular python post (3) and one of the reader's own
/// posts (20).
pub(super) fn sample_snapshot() -> serde_json::Value {
    json!({
        "posts": [
            { "id": 10, "author": 2, "created_at": "2024-05-25T12:00:00Z", "tags": ["django"] },
            { "id": 1, "author": 2, "created_at": "2024-06-01T11:00:00Z", "tags": ["django"] },
            { "id": 2, "author": 2, "created_at": "2024-05-29T12:00:00Z", "tags": ["python"] },
            { "id": 3, "author": 2, "created_at": "2024-06-01T10:00:00Z", "tags": ["python"] },
            { "id": 20, "author": 1, "created_at": "2024-06-01T11:30:00Z", "tags": ["rust"] }
        ],
        "likes": [
            { "user": 1, "post": 10 },
            { "user": 3, "post": 3 },
            { "user": 4, "post": 3 }
        ]
    })
}

pub(super) fn write_sample_snapshot(path: &Utf8Path) {
    let payload = serde_json::to_string_pretty(&sample_snapshot()).expect("serialize snapshot");
    write_utf8(path, payload.as_bytes());
}

/// Write the [`sample_snapshot`] data into a SQLite feed database.
#[cfg(feature = "store-sqlite")]
pub(super) fn write_sample_database(path: &Utf8Path) {
    let connection = rusqlite::Connection::open(path.as_std_path()).expect("create database");
    postfeed_core::create_feed_schema(&connection).expect("create schema");
    connection
        .execute_batch(
            "INSERT INTO tags (id, name) VALUES (1, 'django'), (2, 'python'), (3, 'rust');
             INSERT INTO posts (id, author_id, created_at) VALUES
                 (10, 2, '2024-05-25T12:00:00Z'),
                 (1, 2, '2024-06-01T11:00:00Z'),
                 (2, 2, '2024-05-29T12:00:00Z'),
                 (3, 2, '2024-06-01T10:00:00Z'),
                 (20, 1, '2024-06-01T11:30:00Z');
             INSERT INTO post_tags (post_id, tag_id) VALUES
                 (10, 1), (1, 1), (2, 2), (3, 2), (20, 3);
             INSERT INTO likes (user_id, post_id) VALUES (1, 10), (3, 3), (4, 3);",
        )
        .expect("seed database");
}

pub(super) fn ids(output: &crate::feed::FeedOutput) -> Vec<u64> {
    output.results.iter().map(|entry| entry.id.get()).collect()
}
