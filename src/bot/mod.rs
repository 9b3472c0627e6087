// Discord front-end: the /reddit slash command on top of PostPipeline

pub mod command;
pub mod handler;
pub mod reply;

use serenity::all::{Client, GatewayIntents};
use std::sync::Arc;
use tracing::info;

pub use handler::Handler;
pub use reply::render_reply;

use crate::config::DiscordConfig;
use crate::error::{Result, SubfetchError};
use crate::pipeline::PostPipeline;

/// Connect to Discord and serve slash commands until the gateway closes
pub async fn run(token: &str, pipeline: Arc<PostPipeline>, config: DiscordConfig) -> Result<()> {
    // Slash commands need no privileged intents
    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler::new(pipeline, config))
        .await
        .map_err(|e| SubfetchError::Discord(format!("Error creating client: {}", e)))?;

    info!("Starting Discord client");
    client
        .start()
        .await
        .map_err(|e| SubfetchError::Discord(format!("Client error: {}", e)))
}
