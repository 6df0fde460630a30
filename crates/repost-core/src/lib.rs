//! Core routing logic for the repost relay bot.
//!
//! This crate is framework-agnostic. Telegram and Redis live behind ports (traits)
//! implemented in adapter crates.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod menu;
pub mod messaging;
pub mod notices;
pub mod registry;
pub mod selection;
pub mod service;
pub mod store;
pub mod subscriptions;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
