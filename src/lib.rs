//! Polls a search backend for new error logs, drops near-duplicates and posts
//! the rest to Slack.

pub mod cli;
pub mod config;
pub mod dedup;
pub mod notify;
pub mod poll;
pub mod source;
pub mod watcher;
