use serenity::all::{
    ActivityData, Command, CommandInteraction, Context, CreateInteractionResponseFollowup,
    EditInteractionResponse, EventHandler, Interaction, Ready, ResolvedValue,
};
use serenity::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::DiscordConfig;
use crate::error::{Result, SubfetchError};
use crate::pipeline::PostPipeline;
use crate::post::PostResult;
use super::command::{self, CommandRequest};
use super::reply::render_reply;

pub const FALLBACK_REPLY: &str = "There was an error while executing this command!";

/// Discord bot event handler
pub struct Handler {
    pipeline: Arc<PostPipeline>,
    config: DiscordConfig,
}

impl Handler {
    pub fn new(pipeline: Arc<PostPipeline>, config: DiscordConfig) -> Self {
        Self { pipeline, config }
    }

    async fn handle_command(&self, ctx: &Context, interaction: &CommandInteraction) -> Result<()> {
        // Fetching and muxing can take longer than the 3 second reply window
        interaction.defer(&ctx.http).await.map_err(discord_error)?;

        let request = {
            let options = interaction.data.options();
            CommandRequest::from_options(
                options.iter().filter_map(|option| match &option.value {
                    ResolvedValue::String(value) => Some((option.name, *value)),
                    _ => None,
                }),
                &self.config.default_subreddits,
            )
        };

        let result = match request {
            Ok(request) => {
                info!(
                    "{} requested r/{} ({})",
                    interaction.user.name,
                    request.subreddit,
                    request.page.map(|p| p.as_str()).unwrap_or("random")
                );
                self.pipeline
                    .get_post_from_subreddit(&request.subreddit, request.page)
                    .await
            }
            Err(e) => PostResult::from_error(&e),
        };

        if result.is_error() {
            warn!("Answering {} with {}: {}", interaction.user.name, result.title, result.content);
        }

        let reply = EditInteractionResponse::new().content(render_reply(&result));
        interaction
            .edit_response(&ctx.http, reply)
            .await
            .map_err(discord_error)?;

        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected to Discord!", ready.user.name);

        ctx.set_activity(Some(ActivityData::custom(format!("/{}", self.config.command_name))));

        let commands = vec![command::register(&self.config.command_name)];
        match Command::set_global_commands(&ctx.http, commands).await {
            Ok(registered) => info!("Registered {} slash commands", registered.len()),
            Err(e) => error!("Failed to register slash commands: {:?}", e),
        }
    }

    /// Called for every interaction; only our slash command is handled
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.data.name != self.config.command_name {
            return;
        }

        if let Err(e) = self.handle_command(&ctx, &command).await {
            error!("Failed to answer /{}: {}", command.data.name, e);
            // Don't leave the user staring at "thinking..."
            if let Err(e) = command.create_followup(&ctx.http, fallback_followup()).await {
                error!("Failed to send fallback reply: {}", e);
            }
        }
    }
}

/// Ephemeral notice sent when the real reply could not be delivered
pub fn fallback_followup() -> CreateInteractionResponseFollowup {
    CreateInteractionResponseFollowup::new()
        .content(FALLBACK_REPLY)
        .ephemeral(true)
}

fn discord_error(e: serenity::Error) -> SubfetchError {
    SubfetchError::Discord(e.to_string())
}
