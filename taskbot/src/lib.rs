//! `TaskBot` — chat-platform bot managing a shared to-do list.

pub mod config;
pub mod confirm;
pub mod dispatch;
pub mod gateway;
pub mod handlers;
pub mod jobs;
pub mod render;
pub mod report;
pub mod store;
