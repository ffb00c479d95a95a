//! Inbound message dispatch.
//!
//! The dispatcher strips a recognized command prefix, matches the command
//! keyword, routes pending confirmation replies, invokes the handler under
//! the store lock, and converts handler errors into user-visible replies
//! at this boundary — no command error ever crashes the process.

use std::sync::Arc;

use tokio::time::Duration;

use taskbot_core::ids::{ChannelId, UserId};

use crate::confirm::{self, ConfirmOutcome, ConfirmationGate};
use crate::gateway::{Gateway, notify_direct};
use crate::handlers::{CommandContext, CommandError, Reply, profile, task, team};
use crate::render;
use crate::store::SharedStores;

/// An inbound chat message, as delivered by the hosting platform.
#[derive(Debug, Clone)]
pub struct Inbound {
    /// Author account id.
    pub author: UserId,
    /// Author display name.
    pub author_name: String,
    /// Channel the message arrived in.
    pub channel: ChannelId,
    /// Whether the platform reports the author as an administrator.
    pub is_admin: bool,
    /// Raw message text.
    pub content: String,
    /// Mentioned users, in order, resolved by the platform.
    pub mentions: Vec<UserId>,
}

impl Inbound {
    /// Builds a message with mentions extracted from the text itself.
    ///
    /// The real platform resolves mentions for us; this constructor covers
    /// the console gateway and tests.
    #[must_use]
    pub fn from_text(author: UserId, channel: ChannelId, is_admin: bool, content: &str) -> Self {
        Self {
            author_name: author.to_string(),
            author,
            channel,
            is_admin,
            mentions: extract_mentions(content),
            content: content.to_string(),
        }
    }
}

/// Pulls `<@id>` mention tokens out of raw text, in order.
#[must_use]
pub fn extract_mentions(content: &str) -> Vec<UserId> {
    content
        .split_whitespace()
        .filter(|word| word.starts_with("<@") && word.ends_with('>'))
        .map(UserId::from_mention)
        .collect()
}

/// Recognized command keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    TaskCreate,
    TaskList,
    TaskDone,
    TaskAssign,
    TaskDelete,
    TaskUpdate,
    TaskChart,
    TaskHelp,
    TeamCreate,
    TeamAdd,
    TeamRemove,
    TeamLeader,
    TeamDelete,
    TeamInfo,
    TeamList,
    Profile,
}

impl Keyword {
    fn parse(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "taskcreate" => Some(Self::TaskCreate),
            "tasklist" => Some(Self::TaskList),
            "taskdone" => Some(Self::TaskDone),
            "taskassign" => Some(Self::TaskAssign),
            "taskdelete" => Some(Self::TaskDelete),
            "taskupdate" => Some(Self::TaskUpdate),
            "taskchart" | "taskreport" => Some(Self::TaskChart),
            "taskhelp" => Some(Self::TaskHelp),
            "teamcreate" => Some(Self::TeamCreate),
            "teamadd" => Some(Self::TeamAdd),
            "teamremove" => Some(Self::TeamRemove),
            "teamleader" => Some(Self::TeamLeader),
            "teamdelete" => Some(Self::TeamDelete),
            "teaminfo" => Some(Self::TeamInfo),
            "teamlist" => Some(Self::TeamList),
            "profile" => Some(Self::Profile),
            _ => None,
        }
    }
}

/// Routes inbound messages to command handlers.
pub struct Dispatcher<G> {
    stores: SharedStores,
    gateway: Arc<G>,
    gate: Arc<ConfirmationGate>,
    prefixes: Vec<String>,
    confirm_window: Duration,
}

impl<G: Gateway + 'static> Dispatcher<G> {
    /// Creates a dispatcher over shared stores and an outbound gateway.
    #[must_use]
    pub fn new(
        stores: SharedStores,
        gateway: Arc<G>,
        prefixes: Vec<String>,
        confirm_window: Duration,
    ) -> Self {
        Self {
            stores,
            gateway,
            gate: Arc::new(ConfirmationGate::new()),
            prefixes,
            confirm_window,
        }
    }

    /// Handles one inbound message end to end.
    ///
    /// Pending confirmation replies take precedence over command matching;
    /// anything that is neither is ignored as ordinary chatter.
    pub async fn dispatch(&self, msg: &Inbound) {
        if self
            .gate
            .resolve(&msg.author, &msg.channel, &msg.content)
            .await
        {
            return;
        }

        let Some((keyword, rest)) = self.match_command(&msg.content) else {
            return;
        };
        let ctx = CommandContext {
            invoker: msg.author.clone(),
            invoker_name: msg.author_name.clone(),
            channel: msg.channel.clone(),
            is_admin: msg.is_admin,
            mentions: msg.mentions.clone(),
        };
        tracing::debug!(user = %ctx.invoker, keyword = ?keyword, "handling command");

        match self.run(keyword, &ctx, rest).await {
            Ok(Some(reply)) => self.deliver(&ctx.channel, reply).await,
            Ok(None) => {} // the confirmation flow replies on its own
            Err(err) => {
                if let CommandError::Storage(ref source) = err {
                    tracing::error!(error = %source, user = %ctx.invoker, "store failure while handling command");
                }
                if let Err(e) = self
                    .gateway
                    .send_channel(&ctx.channel, &err.user_message())
                    .await
                {
                    tracing::warn!(error = %e, "failed to report command error");
                }
            }
        }
    }

    /// Strips a recognized prefix and matches the leading keyword.
    fn match_command<'a>(&self, content: &'a str) -> Option<(Keyword, &'a str)> {
        let content = content.trim();
        for prefix in &self.prefixes {
            let Some(stripped) = content.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let stripped = stripped.trim_start();
            let mut parts = stripped.splitn(2, char::is_whitespace);
            if let Some(keyword) = parts.next().and_then(Keyword::parse) {
                return Some((keyword, parts.next().unwrap_or("").trim()));
            }
        }
        None
    }

    /// Runs the matched handler under the store lock.
    ///
    /// Returns `Ok(None)` when the command suspended into a confirmation
    /// wait and will reply later.
    async fn run(
        &self,
        keyword: Keyword,
        ctx: &CommandContext,
        rest: &str,
    ) -> Result<Option<Reply>, CommandError> {
        if keyword == Keyword::TeamDelete {
            let name = {
                let stores = self.stores.lock().await;
                team::delete_request(&stores, ctx, rest)?
            };
            self.begin_team_delete(ctx, name).await;
            return Ok(None);
        }

        let mut stores = self.stores.lock().await;
        let reply = match keyword {
            Keyword::TaskCreate => task::create(&mut stores, ctx, rest)?,
            Keyword::TaskList => task::list(&stores, ctx, rest)?,
            Keyword::TaskDone => task::done(&mut stores, ctx, rest)?,
            Keyword::TaskAssign => task::assign(&mut stores, ctx, rest)?,
            Keyword::TaskDelete => task::delete(&mut stores, ctx, rest)?,
            Keyword::TaskUpdate => task::update(&mut stores, ctx, rest)?,
            Keyword::TaskChart => task::chart(&stores, rest)?,
            Keyword::TaskHelp => {
                Reply::text(render::help((!rest.is_empty()).then_some(rest)))
            }
            Keyword::TeamCreate => team::create(&mut stores, ctx, rest)?,
            Keyword::TeamAdd => team::add_member(&mut stores, ctx, rest)?,
            Keyword::TeamRemove => team::remove_member(&mut stores, ctx, rest)?,
            Keyword::TeamLeader => team::transfer_leadership(&mut stores, ctx, rest)?,
            Keyword::TeamInfo => team::info(&stores, rest)?,
            Keyword::TeamList => team::list(&stores)?,
            Keyword::Profile => profile::profile(&stores, ctx, rest)?,
            Keyword::TeamDelete => unreachable!("handled above"),
        };
        Ok(Some(reply))
    }

    /// Sends the channel reply, then the queued best-effort notifications.
    async fn deliver(&self, channel: &ChannelId, reply: Reply) {
        if let Err(e) = self.gateway.send_channel(channel, &reply.text).await {
            tracing::warn!(error = %e, "failed to send command reply");
        }
        for (user, text) in reply.notifications {
            notify_direct(self.gateway.as_ref(), &user, &text).await;
        }
    }

    /// Suspends a validated team deletion into a confirmation wait.
    async fn begin_team_delete(&self, ctx: &CommandContext, name: String) {
        let rx = self
            .gate
            .register(ctx.invoker.clone(), ctx.channel.clone())
            .await;
        if let Err(e) = self
            .gateway
            .send_channel(&ctx.channel, &render::team_delete_prompt(&name))
            .await
        {
            tracing::warn!(error = %e, "failed to send confirmation prompt");
        }

        let stores = Arc::clone(&self.stores);
        let gateway = Arc::clone(&self.gateway);
        let gate = Arc::clone(&self.gate);
        let window = self.confirm_window;
        let user = ctx.invoker.clone();
        let channel = ctx.channel.clone();
        tokio::spawn(async move {
            let outcome = confirm::await_reply(rx, window).await;
            let text = match outcome {
                ConfirmOutcome::Confirmed => {
                    let mut stores = stores.lock().await;
                    match team::delete_confirmed(&mut stores, &name) {
                        Ok(reply) => reply.text,
                        Err(err) => {
                            if let CommandError::Storage(ref source) = err {
                                tracing::error!(error = %source, "store failure during team deletion");
                            }
                            err.user_message()
                        }
                    }
                }
                ConfirmOutcome::Cancelled => format!("team '{name}' was not deleted"),
                ConfirmOutcome::TimedOut => {
                    gate.clear(&user, &channel).await;
                    format!(
                        "no confirmation within {}s — team '{name}' was not deleted",
                        window.as_secs()
                    )
                }
            };
            if let Err(e) = gateway.send_channel(&channel, &text).await {
                tracing::warn!(error = %e, "failed to send confirmation result");
            }
        });
    }
}
