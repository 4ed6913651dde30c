//! Opaque identifiers for users and posts.
//!
//! Both identifiers wrap a `u64`. [`PostId`] ordering doubles as the final
//! ranking tie-break, so larger identifiers (newer rows) win exact ties.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a post.
///
/// # Examples
/// ```
/// use postfeed_core::PostId;
///
/// let id = PostId::new(7);
/// assert_eq!(id.get(), 7);
/// assert!(PostId::new(8) > id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct PostId(u64);

impl PostId {
    /// Smallest representable identifier.
    pub const MIN: Self = Self(u64::MIN);
    /// Largest representable identifier.
    pub const MAX: Self = Self(u64::MAX);

    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for PostId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a user.
///
/// The ranking core never reads anything about a user beyond this value; the
/// user's interests arrive through their like history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
