//! Discord front end for the queues.
//!
//! The handler registers the `/queue`, `/leave`, `/lobby` and `/clearqueue`
//! slash commands on the configured guild and turns each invocation into a
//! `QueuePool` call with the invoking user's id. Formed matches reach Discord
//! through `DiscordAnnouncer`, which the pool calls after releasing its lock.

pub mod announcer;
pub mod commands;
pub mod embeds;
pub mod handler;
pub mod lobby;
pub mod start;
