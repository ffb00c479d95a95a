//! Periodic background jobs.
//!
//! Two independent loops run alongside dispatch: a liveness ping and a
//! daily task digest, both posting to the configured status channel. Each
//! loop holds the store lock only for the instant it reads, so a stuck
//! send can never block command handling.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

use taskbot_core::ids::ChannelId;

use crate::gateway::Gateway;
use crate::render;
use crate::report;
use crate::store::SharedStores;

/// Spawns the liveness ping loop.
///
/// Posts a short "alive" message to the status channel every `every`
/// interval. Send failures are logged and the loop keeps going; the
/// first tick fires after one full interval, not at startup.
pub fn spawn_alive_ping<G: Gateway + 'static>(
    gateway: Arc<G>,
    channel: ChannelId,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // immediate first tick
        loop {
            ticker.tick().await;
            if let Err(e) = gateway.send_channel(&channel, "taskbot is alive").await {
                tracing::warn!(error = %e, channel = %channel, "alive ping failed");
            } else {
                tracing::debug!(channel = %channel, "alive ping sent");
            }
        }
    })
}

/// Spawns the daily digest loop.
///
/// Posts an all-time task report to the status channel every `every`
/// interval (a day in production, shorter in tests).
pub fn spawn_daily_digest<G: Gateway + 'static>(
    stores: SharedStores,
    gateway: Arc<G>,
    channel: ChannelId,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let text = {
                let stores = stores.lock().await;
                render::report(&report::build(stores.tasks.all(), None, Utc::now()))
            };
            if let Err(e) = gateway.send_channel(&channel, &text).await {
                tracing::warn!(error = %e, channel = %channel, "daily digest failed");
            }
        }
    })
}
