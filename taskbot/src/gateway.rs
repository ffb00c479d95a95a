//! Outbound message gateway abstraction.
//!
//! [`Gateway`] is the seam between the bot and the hosting chat platform.
//! Concrete implementations:
//! - [`RecordingGateway`] — in-process capture for tests
//! - [`ConsoleGateway`] — stdout rendering for the local binary
//!
//! The real platform client (gateway connection, event delivery, embed
//! rendering) lives outside this repository and plugs in behind the same
//! trait.

use std::collections::HashSet;

use tokio::sync::Mutex;

use taskbot_core::ids::{ChannelId, UserId};

/// Errors that can occur when sending through a gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The connection to the platform has been closed.
    #[error("gateway connection closed")]
    Closed,

    /// The recipient does not accept direct messages.
    #[error("user {0} does not accept direct messages")]
    DirectMessagesDisabled(UserId),

    /// An underlying I/O error occurred.
    #[error("gateway I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Async outbound messaging trait.
///
/// Channel sends carry command replies; direct sends carry notifications.
/// Callers own the decision of whether a failure matters — notification
/// paths use [`notify_direct`] and ignore the result by contract.
pub trait Gateway: Send + Sync {
    /// Sends a message to a channel.
    fn send_channel(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;

    /// Sends a direct message to a user.
    fn send_direct(
        &self,
        user: &UserId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;
}

/// Sends a direct notification best-effort.
///
/// Delivery failure (user disallows DMs, connection gone) is logged at
/// debug level and swallowed: a notification must never affect the outcome
/// of the command that triggered it.
pub async fn notify_direct<G: Gateway>(gateway: &G, user: &UserId, text: &str) {
    if let Err(e) = gateway.send_direct(user, text).await {
        tracing::debug!(user = %user, error = %e, "direct notification failed (fire-and-forget)");
    }
}

/// A message captured by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A channel message.
    Channel {
        /// Destination channel.
        channel: ChannelId,
        /// Message text.
        text: String,
    },
    /// A direct message.
    Direct {
        /// Destination user.
        user: UserId,
        /// Message text.
        text: String,
    },
}

/// In-process gateway that records every send, for tests.
///
/// Users listed in the reject set fail direct sends with
/// [`GatewayError::DirectMessagesDisabled`], which lets tests assert that
/// notification failures are swallowed.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Outbound>>,
    reject_direct: HashSet<UserId>,
}

impl RecordingGateway {
    /// Creates a gateway that accepts every send.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway that rejects direct messages to the given users.
    #[must_use]
    pub fn rejecting_direct(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_direct: users.into_iter().collect(),
        }
    }

    /// Snapshot of everything sent so far, in order.
    pub async fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().await.clone()
    }

    /// Drains and returns everything sent so far.
    pub async fn take_sent(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.sent.lock().await)
    }

    /// Texts of all channel messages sent so far, in order.
    pub async fn channel_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                Outbound::Channel { text, .. } => Some(text.clone()),
                Outbound::Direct { .. } => None,
            })
            .collect()
    }

    /// Texts of all direct messages sent to the given user, in order.
    pub async fn direct_texts_to(&self, user: &UserId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                Outbound::Direct { user: to, text } if to == user => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Gateway for RecordingGateway {
    async fn send_channel(&self, channel: &ChannelId, text: &str) -> Result<(), GatewayError> {
        self.sent.lock().await.push(Outbound::Channel {
            channel: channel.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_direct(&self, user: &UserId, text: &str) -> Result<(), GatewayError> {
        if self.reject_direct.contains(user) {
            return Err(GatewayError::DirectMessagesDisabled(user.clone()));
        }
        self.sent.lock().await.push(Outbound::Direct {
            user: user.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Gateway that renders messages to stdout, for the local binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleGateway;

impl ConsoleGateway {
    /// Creates a console gateway.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Gateway for ConsoleGateway {
    async fn send_channel(&self, channel: &ChannelId, text: &str) -> Result<(), GatewayError> {
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        writeln!(out, "[#{channel}] {text}")?;
        Ok(())
    }

    async fn send_direct(&self, user: &UserId, text: &str) -> Result<(), GatewayError> {
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        writeln!(out, "[dm -> {user}] {text}")?;
        Ok(())
    }
}
