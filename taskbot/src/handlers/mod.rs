//! Command handlers: validation, mutation, persistence.
//!
//! Handlers are the only mutators of the record stores. Each one is a
//! synchronous function over `&mut Stores` invoked while the dispatcher
//! holds the store lock; it validates, mutates, persists, and returns a
//! [`Reply`] carrying the channel text plus any queued best-effort direct
//! notifications. Side effects (gateway sends) happen after the lock is
//! released.

pub mod profile;
pub mod task;
pub mod team;

use taskbot_core::ids::{ChannelId, UserId};

use crate::store::StoreError;

/// Errors a command handler can signal.
///
/// All five kinds are caught at the dispatch boundary and converted to a
/// user-visible message; none crash the process. [`CommandError::Storage`]
/// is additionally escalated to the operator log.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Malformed or missing command arguments.
    #[error("{0}")]
    Validation(String),

    /// Referenced task id or team name is absent.
    #[error("{0}")]
    NotFound(String),

    /// Invoker lacks the required relationship or privilege.
    #[error("{0}")]
    Permission(String),

    /// Duplicate name, duplicate membership, or invalid leader removal.
    #[error("{0}")]
    Conflict(String),

    /// The backing store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl CommandError {
    /// The text shown to the invoking user.
    ///
    /// Storage failures are reported generically; the detail goes to the
    /// operator log instead.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(m) | Self::NotFound(m) | Self::Permission(m) | Self::Conflict(m) => {
                m.clone()
            }
            Self::Storage(_) => {
                "something went wrong while saving; the operators have been notified".to_string()
            }
        }
    }
}

/// Everything a handler needs to know about the invoking message.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// The invoking user's account id.
    pub invoker: UserId,
    /// The invoking user's display name, for provenance text.
    pub invoker_name: String,
    /// Channel the command arrived in (replies go back here).
    pub channel: ChannelId,
    /// Whether the platform reports the invoker as an administrator.
    pub is_admin: bool,
    /// Users mentioned in the message, in order, resolved by the platform.
    pub mentions: Vec<UserId>,
}

impl CommandContext {
    /// The first mentioned user, or `token` parsed as a mention/bare id.
    ///
    /// Commands that target another user accept either a real platform
    /// mention or a raw account id typed in its place.
    #[must_use]
    pub fn target_user(&self, token: Option<&str>) -> Option<UserId> {
        self.mentions
            .first()
            .cloned()
            .or_else(|| token.map(UserId::from_mention))
    }
}

/// Result of a successfully handled command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to send back to the invoking channel.
    pub text: String,
    /// Best-effort direct notifications queued by the handler.
    pub notifications: Vec<(UserId, String)>,
}

impl Reply {
    /// A reply with channel text and no notifications.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            notifications: Vec::new(),
        }
    }

    /// Queues a direct notification alongside the channel reply.
    #[must_use]
    pub fn with_notification(mut self, user: UserId, text: impl Into<String>) -> Self {
        self.notifications.push((user, text.into()));
        self
    }
}
