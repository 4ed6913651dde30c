//! Tag names used to categorise posts.
//!
//! Tags are looked up by name, never by row identity. Names are kept
//! verbatim, so `Django` and `django` are distinct tags.
//!
//! # Examples
//! ```
//! use postfeed_core::TagName;
//!
//! let tag = TagName::new("django").expect("valid tag");
//! assert_eq!(tag.as_str(), "django");
//! assert!(TagName::new("  ").is_err());
//! ```

use std::{borrow::Borrow, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest tag name accepted, counted in characters.
pub const MAX_TAG_NAME_LEN: usize = 64;

/// Errors returned by [`TagName::new`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TagNameError {
    /// The name was empty or contained only whitespace.
    #[error("tag name must not be blank")]
    Blank,
    /// The name exceeded [`MAX_TAG_NAME_LEN`] characters.
    #[error("tag name has {length} characters; the limit is {MAX_TAG_NAME_LEN}")]
    TooLong {
        /// Number of characters supplied.
        length: usize,
    },
}

/// A validated tag name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct TagName(String);

impl TagName {
    /// Validate and wrap a tag name.
    ///
    /// # Errors
    /// Returns [`TagNameError::Blank`] for empty or whitespace-only input and
    /// [`TagNameError::TooLong`] when the name exceeds
    /// [`MAX_TAG_NAME_LEN`] characters.
    pub fn new(name: impl Into<String>) -> Result<Self, TagNameError> {
        let raw = name.into();
        if raw.trim().is_empty() {
            return Err(TagNameError::Blank);
        }
        let length = raw.chars().count();
        if length > MAX_TAG_NAME_LEN {
            return Err(TagNameError::TooLong { length });
        }
        Ok(Self(raw))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned name.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Borrow<str> for TagName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TagName {
    type Err = TagNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TagName {
    type Error = TagNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagName> for String {
    fn from(value: TagName) -> Self {
        value.0
    }
}
