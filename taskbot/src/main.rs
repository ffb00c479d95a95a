//! Task bot -- task and team management over a chat console.
//!
//! Runs the full command pipeline (dispatch, stores, confirmation gate,
//! periodic jobs) against a line-oriented stdin console. The hosting chat
//! platform plugs in behind the same [`Gateway`] trait the console uses.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (data under the platform data dir)
//! cargo run --bin taskbot
//!
//! # Custom data directory and faster ping
//! cargo run --bin taskbot -- --data-dir ./data --ping-interval-secs 60
//!
//! # Or via environment variable
//! TASKBOT_DATA_DIR=./data cargo run --bin taskbot
//! ```
//!
//! [`Gateway`]: taskbot::gateway::Gateway

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use taskbot::config::{BotCliArgs, BotConfig};
use taskbot::dispatch::{Dispatcher, Inbound};
use taskbot::gateway::ConsoleGateway;
use taskbot::jobs;
use taskbot::store::Stores;
use taskbot_core::ids::{ChannelId, UserId};

#[tokio::main]
async fn main() {
    let cli = BotCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match BotConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(data_dir = %config.data_dir.display(), "starting taskbot");
    if config.token.is_none() {
        tracing::info!("no platform token configured; serving the local console");
    }

    let stores = match Stores::open(&config.data_dir) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to open stores");
            std::process::exit(1);
        }
    };
    let stores = Arc::new(Mutex::new(stores));
    let gateway = Arc::new(ConsoleGateway::new());

    let status_channel = ChannelId::new(config.status_channel.clone());
    jobs::spawn_alive_ping(
        Arc::clone(&gateway),
        status_channel.clone(),
        config.ping_interval,
    );
    jobs::spawn_daily_digest(
        Arc::clone(&stores),
        Arc::clone(&gateway),
        status_channel,
        config.digest_interval,
    );

    let dispatcher = Dispatcher::new(
        stores,
        gateway,
        config.prefixes.clone(),
        config.confirm_timeout,
    );

    // The console operator acts as a single admin user in one channel.
    let operator = UserId::new("operator");
    let channel = ChannelId::new("console");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read from stdin");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            break;
        }
        let msg = Inbound::from_text(operator.clone(), channel.clone(), true, trimmed);
        dispatcher.dispatch(&msg).await;
    }

    tracing::info!("taskbot shutting down");
}
