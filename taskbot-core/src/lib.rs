//! `TaskBot` core — record model and command grammar for the shared to-do bot.

pub mod command;
pub mod ids;
pub mod task;
pub mod team;
