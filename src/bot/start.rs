use crate::bot::handler::Handler;
use crate::config::Config;
use crate::error::AppError;
use crate::queues::queue_pool::QueuePool;
use serenity::all::{Client, GatewayIntents};
use serenity::http::Http;
use std::sync::Arc;

/// Builds the Discord client and hands back its HTTP client so other services
/// share the same rate limits.
///
/// Slash commands and lobby buttons only need the `GUILDS` intent; no
/// privileged intents are requested.
pub async fn init_bot(config: &Config, pool: Arc<QueuePool>) -> Result<(Client, Arc<Http>), AppError> {
    let intents = GatewayIntents::GUILDS;

    let handler = Handler::new(pool, config.guild_id, config.lobby_channel_id);

    let client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await?;
    let http = client.http.clone();

    Ok((client, http))
}

/// Connects to the gateway and runs until the client shuts down.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    log::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
