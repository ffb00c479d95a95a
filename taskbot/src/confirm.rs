//! Confirmation gate for destructive commands.
//!
//! Team deletion suspends mid-command and waits for the invoker's next
//! message in the same channel: an affirmative reply confirms, anything
//! else cancels, and a fixed timeout cancels with no state change. The
//! wait is the only multi-step interactive state machine in the bot and
//! is terminal in all three outcomes.

use std::collections::HashMap;

use tokio::sync::{Mutex, oneshot};
use tokio::time::Duration;

use taskbot_core::ids::{ChannelId, UserId};

/// Terminal outcome of a confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The invoker replied affirmatively.
    Confirmed,
    /// The invoker replied with anything else, or the wait was superseded.
    Cancelled,
    /// No reply arrived within the window.
    TimedOut,
}

/// Whether a reply counts as an explicit yes.
#[must_use]
pub fn is_affirmative(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "yes" | "y" | "confirm")
}

/// Routes follow-up replies to suspended commands.
///
/// One wait is tracked per (user, channel) pair; registering a second
/// wait for the same pair supersedes (cancels) the first.
#[derive(Default)]
pub struct ConfirmationGate {
    pending: Mutex<HashMap<(UserId, ChannelId), oneshot::Sender<String>>>,
}

impl ConfirmationGate {
    /// Creates an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wait for the user's next message in the channel.
    pub async fn register(&self, user: UserId, channel: ChannelId) -> oneshot::Receiver<String> {
        let (tx, rx) = oneshot::channel();
        // Dropping a superseded sender resolves the old wait as Cancelled.
        self.pending.lock().await.insert((user, channel), tx);
        rx
    }

    /// Offers an inbound message to a pending wait.
    ///
    /// Returns `true` if a wait consumed it (the message must then NOT be
    /// dispatched as a command).
    pub async fn resolve(&self, user: &UserId, channel: &ChannelId, text: &str) -> bool {
        let key = (user.clone(), channel.clone());
        let Some(tx) = self.pending.lock().await.remove(&key) else {
            return false;
        };
        // The waiter may have timed out and gone; the message is consumed
        // either way, matching "the wait is terminal".
        let _ = tx.send(text.to_string());
        true
    }

    /// Drops a pending wait (called by the waiter on timeout) so later
    /// messages flow back to normal dispatch.
    pub async fn clear(&self, user: &UserId, channel: &ChannelId) {
        self.pending
            .lock()
            .await
            .remove(&(user.clone(), channel.clone()));
    }

    /// Number of waits currently pending.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

/// Awaits a registered reply, classifying it into a [`ConfirmOutcome`].
pub async fn await_reply(rx: oneshot::Receiver<String>, window: Duration) -> ConfirmOutcome {
    match tokio::time::timeout(window, rx).await {
        Ok(Ok(text)) if is_affirmative(&text) => ConfirmOutcome::Confirmed,
        Ok(Ok(_)) => ConfirmOutcome::Cancelled,
        // Sender dropped: this wait was superseded by a newer one.
        Ok(Err(_)) => ConfirmOutcome::Cancelled,
        Err(_) => ConfirmOutcome::TimedOut,
    }
}
