//! Subfetch - Reddit posts for Discord
//!
//! Fetches a random submission from a subreddit, classifies its media,
//! re-muxes reddit video with ffmpeg, relays local media to a temporary
//! file host and answers a Discord slash command with the result.

pub mod bot;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod post;
pub mod reddit;
pub mod relay;
pub mod scratch;

#[cfg(test)]
mod testing;
