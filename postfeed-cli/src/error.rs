//! Error types emitted by the Postfeed CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::convert::Infallible;
use std::sync::Arc;

use camino::Utf8PathBuf;
#[cfg(feature = "store-sqlite")]
use postfeed_core::SqliteFeedStoreError;
use postfeed_scorer::RankingConfigError;
use thiserror::Error;

/// Errors emitted by the Postfeed CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long option name.
        field: &'static str,
        /// Environment variable that can supply the option.
        env: &'static str,
    },
    /// Neither a snapshot nor a feed database was supplied.
    #[error("missing feed source (set --snapshot or {snapshot_env}, or --feed-db or {feed_db_env})")]
    MissingSource {
        /// Environment variable that can supply the snapshot path.
        snapshot_env: &'static str,
        /// Environment variable that can supply the database path.
        feed_db_env: &'static str,
    },
    /// Both a snapshot and a feed database were supplied.
    #[error("--snapshot and --feed-db are mutually exclusive")]
    ConflictingSources,
    /// The ranking instant was not an RFC 3339 timestamp.
    #[error("--now value {raw:?} is not an RFC 3339 timestamp: {source}")]
    InvalidNow {
        /// Rejected value.
        raw: String,
        /// Parser error.
        #[source]
        source: chrono::ParseError,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        /// Cargo feature name.
        feature: &'static str,
        /// Operation that needed the feature.
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Long option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Long option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Long option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Ranking weights or the decay rate were invalid.
    #[error("invalid ranking configuration: {0}")]
    RankingConfig(#[from] RankingConfigError),
    /// Reading the snapshot file failed.
    #[error("failed to read snapshot at {path:?}: {source}")]
    ReadSnapshot {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The snapshot was not valid JSON or violated the snapshot schema.
    #[error("failed to parse snapshot JSON at {path:?}: {source}")]
    ParseSnapshot {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Opening or querying the feed database failed.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    FeedStore(#[from] SqliteFeedStoreError),
    /// Serializing the feed page failed.
    #[error("failed to serialize feed page: {0}")]
    SerializeFeedPage(#[source] serde_json::Error),
    /// Writing the feed page failed.
    #[error("failed to write feed output: {0}")]
    WriteFeedOutput(#[source] std::io::Error),
}

impl From<Infallible> for CliError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
