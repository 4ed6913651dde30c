//! Command-line interface for ranking Postfeed feeds offline.
//!
//! `postfeed feed` loads posts and likes from a JSON snapshot or a `SQLite`
//! feed database, ranks every candidate for one user and prints the
//! requested page as JSON.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod feed;

pub use error::CliError;

use feed::FeedArgs;

pub(crate) const ARG_USER: &str = "user";
pub(crate) const ARG_SNAPSHOT: &str = "snapshot";
pub(crate) const ARG_FEED_DB: &str = "feed-db";
pub(crate) const ARG_OFFSET: &str = "offset";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_NOW: &str = "now";
pub(crate) const ARG_WEIGHT_RECENCY: &str = "weight-recency";
pub(crate) const ARG_WEIGHT_POPULARITY: &str = "weight-popularity";
pub(crate) const ARG_WEIGHT_AFFINITY: &str = "weight-affinity";
pub(crate) const ARG_RECENCY_LAMBDA: &str = "recency-lambda";
pub(crate) const ENV_USER: &str = "POSTFEED_CMDS_FEED_USER";
pub(crate) const ENV_SNAPSHOT: &str = "POSTFEED_CMDS_FEED_SNAPSHOT";
pub(crate) const ENV_FEED_DB: &str = "POSTFEED_CMDS_FEED_FEED_DB";

/// Run the Postfeed CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration or inputs are invalid,
/// or when the ranked page cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Feed(args) => feed::run_feed(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "postfeed",
    about = "Personalised feed ranking for Postfeed",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank the feed for one user and print a page of results.
    Feed(FeedArgs),
}

#[cfg(test)]
mod tests;
