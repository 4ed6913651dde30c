//! Feed command implementation for the Postfeed CLI.

use std::collections::BTreeSet;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use postfeed_core::{FeedStore, Like, MemoryFeedStore, Post, PostId, TagName, UserId};
use postfeed_fs::{PathKind, path_kind, read_utf8_to_string};
use postfeed_scorer::{
    ENV_RECENCY_LAMBDA, ENV_WEIGHT_AFFINITY, ENV_WEIGHT_POPULARITY, ENV_WEIGHT_RECENCY, FeedPage,
    Pagination, Ranker, RankingConfig, RankingConfigError, ScoredPost, assemble_feed,
};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_FEED_DB, ARG_LIMIT, ARG_NOW, ARG_OFFSET, ARG_RECENCY_LAMBDA, ARG_SNAPSHOT, ARG_USER,
    ARG_WEIGHT_AFFINITY, ARG_WEIGHT_POPULARITY, ARG_WEIGHT_RECENCY, CliError, ENV_FEED_DB,
    ENV_SNAPSHOT, ENV_USER,
};

/// CLI arguments for the `feed` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank every post a user did not write and print one page \
                 of the feed as JSON. Posts and likes come from a JSON \
                 snapshot or a SQLite feed database. Ranking weights default \
                 to the WEIGHT_RECENCY, WEIGHT_POPULARITY, WEIGHT_AFFINITY \
                 and RECENCY_LAMBDA environment variables.",
    about = "Rank a user's feed"
)]
#[ortho_config(prefix = "POSTFEED")]
pub(crate) struct FeedArgs {
    /// Identifier of the user the feed is ranked for.
    #[arg(long = ARG_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user: Option<u64>,
    /// Path to a JSON snapshot of posts and likes.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// Path to a SQLite feed database.
    #[arg(long = ARG_FEED_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) feed_db: Option<Utf8PathBuf>,
    /// Number of ranked posts to skip.
    #[arg(long = ARG_OFFSET, value_name = "count")]
    #[serde(default)]
    pub(crate) offset: Option<usize>,
    /// Page size, clamped to 1..=100 (default 20).
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Ranking instant as an RFC 3339 timestamp (default: now).
    #[arg(long = ARG_NOW, value_name = "timestamp")]
    #[serde(default)]
    pub(crate) now: Option<String>,
    /// Override the recency weight.
    #[arg(long = ARG_WEIGHT_RECENCY, value_name = "weight")]
    #[serde(default)]
    pub(crate) weight_recency: Option<f64>,
    /// Override the popularity weight.
    #[arg(long = ARG_WEIGHT_POPULARITY, value_name = "weight")]
    #[serde(default)]
    pub(crate) weight_popularity: Option<f64>,
    /// Override the affinity weight.
    #[arg(long = ARG_WEIGHT_AFFINITY, value_name = "weight")]
    #[serde(default)]
    pub(crate) weight_affinity: Option<f64>,
    /// Override the recency decay rate per hour.
    #[arg(long = ARG_RECENCY_LAMBDA, value_name = "rate")]
    #[serde(default)]
    pub(crate) recency_lambda: Option<f64>,
}

impl FeedArgs {
    pub(crate) fn into_config(self) -> Result<FeedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FeedConfig::try_from(merged)
    }
}

/// Where posts and likes are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FeedSource {
    /// JSON snapshot file.
    Snapshot(Utf8PathBuf),
    /// SQLite feed database.
    Database(Utf8PathBuf),
}

/// Weight values given on the command line, layered over the environment.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct WeightOverrides {
    pub(crate) recency: Option<f64>,
    pub(crate) popularity: Option<f64>,
    pub(crate) affinity: Option<f64>,
    pub(crate) recency_lambda: Option<f64>,
}

impl WeightOverrides {
    fn value_for(&self, name: &str) -> Option<f64> {
        match name {
            ENV_WEIGHT_RECENCY => self.recency,
            ENV_WEIGHT_POPULARITY => self.popularity,
            ENV_WEIGHT_AFFINITY => self.affinity,
            ENV_RECENCY_LAMBDA => self.recency_lambda,
            _ => None,
        }
    }

    /// Resolve the ranking configuration, preferring overrides to `env`.
    pub(crate) fn resolve<F>(&self, env: F) -> Result<RankingConfig, RankingConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        RankingConfig::from_lookup(|name| {
            self.value_for(name)
                .map(|value| value.to_string())
                .or_else(|| env(name))
        })
    }
}

/// Resolved `feed` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FeedConfig {
    pub(crate) user: UserId,
    pub(crate) source: FeedSource,
    pub(crate) pagination: Pagination,
    pub(crate) now: Option<DateTime<Utc>>,
    pub(crate) weights: WeightOverrides,
}

impl FeedConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match &self.source {
            FeedSource::Snapshot(path) => Self::require_existing(path, ARG_SNAPSHOT),
            FeedSource::Database(path) => Self::require_existing(path, ARG_FEED_DB),
        }
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match path_kind(path) {
            Ok(PathKind::File) => Ok(()),
            Ok(PathKind::Directory | PathKind::Other) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<FeedArgs> for FeedConfig {
    type Error = CliError;

    fn try_from(args: FeedArgs) -> Result<Self, Self::Error> {
        let user = args.user.map(UserId::new).ok_or(CliError::MissingArgument {
            field: ARG_USER,
            env: ENV_USER,
        })?;
        let source = match (args.snapshot, args.feed_db) {
            (Some(path), None) => FeedSource::Snapshot(path),
            (None, Some(path)) => FeedSource::Database(path),
            (Some(_), Some(_)) => return Err(CliError::ConflictingSources),
            (None, None) => {
                return Err(CliError::MissingSource {
                    snapshot_env: ENV_SNAPSHOT,
                    feed_db_env: ENV_FEED_DB,
                });
            }
        };
        let now = args.now.as_deref().map(parse_now).transpose()?;
        Ok(Self {
            user,
            source,
            pagination: Pagination::from_options(args.offset, args.limit),
            now,
            weights: WeightOverrides {
                recency: args.weight_recency,
                popularity: args.weight_popularity,
                affinity: args.weight_affinity,
                recency_lambda: args.recency_lambda,
            },
        })
    }
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|source| CliError::InvalidNow {
            raw: raw.to_owned(),
            source,
        })
}

/// Posts and likes as stored in a snapshot file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(crate) struct Snapshot {
    #[serde(default)]
    pub(crate) posts: Vec<Post>,
    #[serde(default)]
    pub(crate) likes: Vec<Like>,
}

impl Snapshot {
    /// Load the snapshot into an in-memory store, warning about entries
    /// that cannot contribute to a feed.
    pub(crate) fn into_store(self) -> MemoryFeedStore {
        let mut store = MemoryFeedStore::new();
        for post in self.posts {
            let id = post.id;
            if store.insert_post(post).is_some() {
                log::warn!("snapshot lists post {id} more than once; keeping the last entry");
            }
        }
        for like in self.likes {
            if !store.contains_post(like.post) {
                log::warn!(
                    "like by user {} references unknown post {}",
                    like.user,
                    like.post
                );
            }
            if !store.like(like) {
                log::debug!("duplicate like by user {} on post {}", like.user, like.post);
            }
        }
        store
    }
}

/// Load a JSON snapshot from disk into an in-memory store.
pub(crate) fn load_snapshot(path: &Utf8Path) -> Result<MemoryFeedStore, CliError> {
    let contents = read_utf8_to_string(path).map_err(|source| CliError::ReadSnapshot {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: Snapshot =
        serde_json::from_str(&contents).map_err(|source| CliError::ParseSnapshot {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!(
        "loaded snapshot {path} with {} posts and {} likes",
        snapshot.posts.len(),
        snapshot.likes.len()
    );
    Ok(snapshot.into_store())
}

/// One ranked post as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FeedEntry {
    pub(crate) id: PostId,
    pub(crate) author: Option<UserId>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) tags: BTreeSet<TagName>,
    pub(crate) like_count: u64,
    pub(crate) score: f64,
}

impl From<ScoredPost> for FeedEntry {
    fn from(entry: ScoredPost) -> Self {
        Self {
            id: entry.post.id,
            author: entry.post.author,
            created_at: entry.post.created_at,
            tags: entry.post.tags,
            like_count: entry.post.like_count,
            score: entry.score,
        }
    }
}

/// A page of the feed as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FeedOutput {
    pub(crate) count: usize,
    pub(crate) results: Vec<FeedEntry>,
}

impl From<FeedPage> for FeedOutput {
    fn from(page: FeedPage) -> Self {
        Self {
            count: page.count,
            results: page.results.into_iter().map(FeedEntry::from).collect(),
        }
    }
}

pub(crate) fn run_feed(args: FeedArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_feed_with(args, |name| std::env::var(name).ok(), &mut stdout)
}

pub(crate) fn run_feed_with<F>(
    args: FeedArgs,
    env: F,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = resolve_feed_config(args)?;
    let page = execute_feed(&config, env)?;
    write_feed_page(writer, page)
}

fn resolve_feed_config(args: FeedArgs) -> Result<FeedConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn execute_feed<F>(config: &FeedConfig, env: F) -> Result<FeedPage, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let ranker = Ranker::new(config.weights.resolve(env)?)?;
    let now = config.now.unwrap_or_else(Utc::now);
    match &config.source {
        FeedSource::Snapshot(path) => {
            let store = load_snapshot(path)?;
            rank_page(&ranker, &store, config, now)
        }
        FeedSource::Database(path) => rank_database(&ranker, path, config, now),
    }
}

fn rank_page<S>(
    ranker: &Ranker,
    store: &S,
    config: &FeedConfig,
    now: DateTime<Utc>,
) -> Result<FeedPage, CliError>
where
    S: FeedStore + ?Sized,
    CliError: From<S::Error>,
{
    assemble_feed(ranker, store, config.user, config.pagination, now).map_err(CliError::from)
}

#[cfg(feature = "store-sqlite")]
fn rank_database(
    ranker: &Ranker,
    path: &Utf8Path,
    config: &FeedConfig,
    now: DateTime<Utc>,
) -> Result<FeedPage, CliError> {
    let store = postfeed_core::SqliteFeedStore::open(path.as_std_path())?;
    rank_page(ranker, &store, config, now)
}

#[cfg(not(feature = "store-sqlite"))]
fn rank_database(
    _ranker: &Ranker,
    _path: &Utf8Path,
    _config: &FeedConfig,
    _now: DateTime<Utc>,
) -> Result<FeedPage, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "reading a feed database",
    })
}

fn write_feed_page(writer: &mut dyn Write, page: FeedPage) -> Result<(), CliError> {
    let output = FeedOutput::from(page);
    let payload = serde_json::to_string_pretty(&output).map_err(CliError::SerializeFeedPage)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteFeedOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteFeedOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FeedConfig, CliError> {
    let merged = FeedArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FeedConfig::try_from(merged)
}
