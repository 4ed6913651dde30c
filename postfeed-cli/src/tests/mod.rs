//! Shared test harness modules for the Postfeed CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod feed_unit;
mod helpers;
