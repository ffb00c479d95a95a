//! Opaque identifiers for chat-platform users and channels.
//!
//! The hosting platform assigns account and channel identifiers; the bot
//! never interprets them beyond equality. [`UserId`] additionally knows how
//! to parse and render platform mention tokens (`<@12345>`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a user account on the hosting chat platform.
///
/// Wraps the platform's account id as an opaque string. In embed text a
/// user is referenced by mention token so the platform renders a display
/// name; the bot itself only compares ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user identifier from a string representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this user id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a mention token (`<@123>` or `<@!123>`) into a `UserId`.
    ///
    /// Bare tokens are accepted as-is, so a raw account id passed on the
    /// command line resolves the same way a real mention does.
    #[must_use]
    pub fn from_mention(token: &str) -> Self {
        let token = token.trim();
        let inner = token
            .strip_prefix("<@")
            .and_then(|s| s.strip_suffix('>'))
            .map(|s| s.trim_start_matches('!'));
        Self(inner.unwrap_or(token).to_string())
    }

    /// Renders this id as a platform mention token.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a channel on the hosting chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel identifier from a string representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this channel id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
