//! Focused unit tests covering feed CLI configuration, loading and output.

use std::collections::HashMap;

use camino::Utf8PathBuf;
use chrono::{TimeZone, Utc};
use ortho_config::MergeComposer;
use postfeed_core::{FeedStore, PostId, UserId};
use postfeed_scorer::{DEFAULT_LIMIT, Pagination, RankingConfigError};
use rstest::rstest;
use serde_json::json;

use super::helpers::{
    DEFAULT_ORDER, READER, REFERENCE_NOW, Workspace, ids, write_sample_snapshot, write_utf8,
};
use super::*;
use crate::feed::{
    FeedArgs, FeedConfig, FeedOutput, FeedSource, Snapshot, WeightOverrides,
    config_from_layers_for_test, execute_feed, load_snapshot, run_feed_with,
};

fn snapshot_args(path: &Utf8PathBuf) -> FeedArgs {
    FeedArgs {
        user: Some(READER),
        snapshot: Some(path.clone()),
        now: Some(REFERENCE_NOW.to_owned()),
        ..FeedArgs::default()
    }
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
    move |name| map.get(name).cloned()
}

fn no_env(_name: &str) -> Option<String> {
    None
}

#[rstest]
fn converting_without_user_errors() {
    let args = FeedArgs {
        user: None,
        snapshot: Some(Utf8PathBuf::from("feed.json")),
        ..FeedArgs::default()
    };
    let err = FeedConfig::try_from(args).expect_err("missing user should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_USER);
            assert_eq!(env, ENV_USER);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_without_source_errors() {
    let args = FeedArgs {
        user: Some(READER),
        ..FeedArgs::default()
    };
    let err = FeedConfig::try_from(args).expect_err("missing source should error");
    assert_eq!(
        err.to_string(),
        "missing feed source (set --snapshot or POSTFEED_CMDS_FEED_SNAPSHOT, \
         or --feed-db or POSTFEED_CMDS_FEED_FEED_DB)"
    );
    match err {
        CliError::MissingSource {
            snapshot_env,
            feed_db_env,
        } => {
            assert_eq!(snapshot_env, ENV_SNAPSHOT);
            assert_eq!(feed_db_env, ENV_FEED_DB);
        }
        other => panic!("expected MissingSource, found {other:?}"),
    }
}

#[rstest]
fn converting_with_both_sources_errors() {
    let args = FeedArgs {
        user: Some(READER),
        snapshot: Some(Utf8PathBuf::from("feed.json")),
        feed_db: Some(Utf8PathBuf::from("feed.db")),
        ..FeedArgs::default()
    };
    let err = FeedConfig::try_from(args).expect_err("two sources should error");
    assert!(matches!(err, CliError::ConflictingSources), "found {err:?}");
}

#[rstest]
#[case("yesterday")]
#[case("2024-06-01 12:00")]
fn converting_with_malformed_now_errors(#[case] raw: &str) {
    let args = FeedArgs {
        now: Some(raw.to_owned()),
        ..snapshot_args(&Utf8PathBuf::from("feed.json"))
    };
    let err = FeedConfig::try_from(args).expect_err("malformed instant should error");
    match err {
        CliError::InvalidNow { raw: found, .. } => assert_eq!(found, raw),
        other => panic!("expected InvalidNow, found {other:?}"),
    }
}

#[rstest]
fn converting_applies_defaults_and_offsets() {
    let args = FeedArgs {
        feed_db: Some(Utf8PathBuf::from("feed.db")),
        user: Some(9),
        now: Some("2024-06-01T14:00:00+02:00".to_owned()),
        limit: Some(500),
        ..FeedArgs::default()
    };
    let config = FeedConfig::try_from(args).expect("config should build");
    assert_eq!(config.user, UserId::new(9));
    assert_eq!(config.source, FeedSource::Database(Utf8PathBuf::from("feed.db")));
    assert_eq!(config.pagination, Pagination::new(0, 100));
    assert_eq!(
        config.now,
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single()
    );
    assert_eq!(config.weights, WeightOverrides::default());
}

#[rstest]
fn default_pagination_is_first_page() {
    let config =
        FeedConfig::try_from(snapshot_args(&Utf8PathBuf::from("feed.json"))).expect("config");
    assert_eq!(config.pagination.offset(), 0);
    assert_eq!(config.pagination.limit(), DEFAULT_LIMIT);
}

#[rstest]
fn validate_sources_reports_missing_files() {
    let workspace = Workspace::new();
    let config = FeedConfig::try_from(snapshot_args(&workspace.root.join("absent.json")))
        .expect("config should build");
    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_SNAPSHOT),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let workspace = Workspace::new();
    let args = FeedArgs {
        user: Some(READER),
        feed_db: Some(workspace.root.clone()),
        ..FeedArgs::default()
    };
    let config = FeedConfig::try_from(args).expect("config should build");
    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_FEED_DB);
            assert_eq!(path, workspace.root);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn weight_overrides_take_precedence_over_environment() {
    let overrides = WeightOverrides {
        popularity: Some(5.0),
        ..WeightOverrides::default()
    };
    let config = overrides
        .resolve(env_from(&[
            ("WEIGHT_POPULARITY", "0.9"),
            ("WEIGHT_AFFINITY", "0.7"),
        ]))
        .expect("valid configuration");
    assert_eq!(config.weights.popularity, 5.0);
    assert_eq!(config.weights.affinity, 0.7);
    assert_eq!(config.weights.recency, 0.5);
    assert_eq!(config.recency_lambda, 0.05);
}

#[rstest]
fn invalid_overrides_surface_ranking_errors() {
    let workspace = Workspace::new();
    let path = workspace.root.join("feed.json");
    write_sample_snapshot(&path);
    let mut config = FeedConfig::try_from(snapshot_args(&path)).expect("config should build");
    config.weights.recency_lambda = Some(-1.0);
    let err = execute_feed(&config, no_env).expect_err("negative lambda should fail");
    match err {
        CliError::RankingConfig(RankingConfigError::InvalidRecencyLambda { .. }) => {}
        other => panic!("expected RankingConfig, found {other:?}"),
    }
}

#[rstest]
fn malformed_environment_surfaces_ranking_errors() {
    let workspace = Workspace::new();
    let path = workspace.root.join("feed.json");
    write_sample_snapshot(&path);
    let config = FeedConfig::try_from(snapshot_args(&path)).expect("config should build");
    let err = execute_feed(&config, env_from(&[("RECENCY_LAMBDA", "slow")]))
        .expect_err("malformed lambda should fail");
    assert!(
        matches!(err, CliError::RankingConfig(RankingConfigError::Parse { .. })),
        "found {err:?}"
    );
}

#[rstest]
fn snapshot_store_keeps_last_duplicate_and_ignores_unknown_likes() {
    let snapshot: Snapshot = serde_json::from_value(json!({
        "posts": [
            { "id": 5, "author": 2, "created_at": "2024-06-01T08:00:00Z", "tags": ["go"] },
            { "id": 5, "author": 2, "created_at": "2024-06-01T09:00:00Z", "tags": ["rust"] }
        ],
        "likes": [
            { "user": 1, "post": 5 },
            { "user": 1, "post": 5 },
            { "user": 1, "post": 99 }
        ]
    }))
    .expect("snapshot should decode");
    let store = snapshot.into_store();
    assert_eq!(store.post_count(), 1);
    assert_eq!(store.like_count(PostId::new(5)), 1);
    let liked = store.liked_tags(UserId::new(READER)).expect("infallible");
    let names: Vec<&str> = liked.iter().map(|tag| tag.as_str()).collect();
    assert_eq!(names, vec!["rust"]);
}

#[rstest]
fn snapshot_without_likes_decodes() {
    let snapshot: Snapshot =
        serde_json::from_value(json!({ "posts": [] })).expect("snapshot should decode");
    assert!(snapshot.likes.is_empty());
}

#[rstest]
fn load_snapshot_reports_io_and_json_errors() {
    let workspace = Workspace::new();
    let missing = workspace.root.join("missing.json");
    match load_snapshot(&missing).expect_err("missing snapshot should error") {
        CliError::ReadSnapshot { path, .. } => assert_eq!(path, missing),
        other => panic!("expected ReadSnapshot, found {other:?}"),
    }

    let broken = workspace.root.join("broken.json");
    write_utf8(&broken, b"{ not json");
    match load_snapshot(&broken).expect_err("broken snapshot should error") {
        CliError::ParseSnapshot { path, .. } => assert_eq!(path, broken),
        other => panic!("expected ParseSnapshot, found {other:?}"),
    }

    let blank_tag = workspace.root.join("blank-tag.json");
    write_utf8(
        &blank_tag,
        br#"{"posts":[{"id":1,"author":2,"created_at":"2024-06-01T08:00:00Z","tags":["  "]}]}"#,
    );
    assert!(matches!(
        load_snapshot(&blank_tag),
        Err(CliError::ParseSnapshot { .. })
    ));
}

#[rstest]
fn snapshot_feed_excludes_own_posts_and_ranks() {
    let workspace = Workspace::new();
    let path = workspace.root.join("feed.json");
    write_sample_snapshot(&path);
    let config = FeedConfig::try_from(snapshot_args(&path)).expect("config should build");
    let page = execute_feed(&config, no_env).expect("feed should rank");
    let output = FeedOutput::from(page);
    assert_eq!(output.count, 4);
    assert_eq!(ids(&output), DEFAULT_ORDER.to_vec());
}

#[rstest]
fn run_feed_writes_pretty_json_page() {
    let workspace = Workspace::new();
    let path = workspace.root.join("feed.json");
    write_sample_snapshot(&path);
    let args = FeedArgs {
        limit: Some(1),
        ..snapshot_args(&path)
    };
    let mut buffer = Vec::new();
    run_feed_with(args, no_env, &mut buffer).expect("feed should print");

    let stdout = String::from_utf8(buffer).expect("stdout utf-8");
    assert!(stdout.ends_with("}\n"));
    assert!(stdout.contains("\n  \"count\": 4"));
    let output: FeedOutput = serde_json::from_str(&stdout).expect("output should be JSON");
    let entry = output.results.first().expect("one entry");
    assert_eq!(output.results.len(), 1);
    assert_eq!(entry.id, PostId::new(1));
    assert_eq!(entry.author, Some(UserId::new(2)));
    assert_eq!(entry.like_count, 0);
    assert!(entry.tags.iter().any(|tag| tag.as_str() == "django"));
    assert!(entry.score > 0.0);
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "user": "not-a-number" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "user": 7,
            "limit": 5,
            "weight_affinity": 0.4,
        }),
        None,
    );
    composer.push_environment(json!({
        "snapshot": "from-env.json",
        "weight_affinity": 0.6,
    }));
    composer.push_cli(json!({
        "user": 1,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.user, UserId::new(1));
    assert_eq!(
        config.source,
        FeedSource::Snapshot(Utf8PathBuf::from("from-env.json"))
    );
    assert_eq!(config.pagination, Pagination::new(0, 5));
    assert_eq!(config.weights.affinity, Some(0.6));
}

#[cfg(feature = "store-sqlite")]
#[rstest]
fn database_feed_matches_snapshot_feed() {
    use super::helpers::write_sample_database;

    let workspace = Workspace::new();
    let path = workspace.root.join("feed.db");
    write_sample_database(&path);
    let args = FeedArgs {
        user: Some(READER),
        feed_db: Some(path),
        now: Some(REFERENCE_NOW.to_owned()),
        ..FeedArgs::default()
    };
    let config = FeedConfig::try_from(args).expect("config should build");
    config.validate_sources().expect("database exists");
    let output = FeedOutput::from(execute_feed(&config, no_env).expect("feed should rank"));
    assert_eq!(output.count, 4);
    assert_eq!(ids(&output), DEFAULT_ORDER.to_vec());
    let liked = output
        .results
        .iter()
        .find(|entry| entry.id == PostId::new(3))
        .expect("popular post ranked");
    assert_eq!(liked.like_count, 2);
}

#[cfg(feature = "store-sqlite")]
#[rstest]
fn unreadable_database_surfaces_store_errors() {
    let workspace = Workspace::new();
    let path = workspace.root.join("feed.db");
    write_utf8(&path, b"this is not a sqlite database");
    let args = FeedArgs {
        user: Some(READER),
        feed_db: Some(path),
        now: Some(REFERENCE_NOW.to_owned()),
        ..FeedArgs::default()
    };
    let config = FeedConfig::try_from(args).expect("config should build");
    let err = execute_feed(&config, no_env).expect_err("garbage database should fail");
    assert!(matches!(err, CliError::FeedStore(_)), "found {err:?}");
}
