use crate::bot::commands::{self, CommandReply, QueueCommand};
use crate::bot::lobby::{self, DiscordLobby, LobbyBoard};
use crate::queues::queue_entry::UserId;
use crate::queues::queue_pool::QueuePool;
use serenity::all::{
    ActivityData, ChannelId, CommandInteraction, ComponentInteraction, Context,
    CreateInteractionResponse, CreateInteractionResponseMessage, EventHandler, GuildId,
    Interaction, Ready,
};
use serenity::async_trait;
use std::sync::Arc;

fn response(reply: &CommandReply) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(reply.embed())
            .ephemeral(!reply.is_public()),
    )
}

/// Discord bot event handler
pub struct Handler {
    pool: Arc<QueuePool>,
    guild_id: GuildId,
    lobby_channel: Option<ChannelId>,
    board: LobbyBoard,
}

impl Handler {
    pub fn new(pool: Arc<QueuePool>, guild_id: u64, lobby_channel_id: Option<u64>) -> Self {
        Handler {
            pool,
            guild_id: GuildId::new(guild_id),
            lobby_channel: lobby_channel_id.map(ChannelId::new),
            board: LobbyBoard::new(),
        }
    }

    async fn handle_command(&self, ctx: &Context, command: &CommandInteraction) {
        let Some(kind) = QueueCommand::from_name(&command.data.name) else {
            log::warn!("Received unknown command /{}", command.data.name);
            return;
        };

        let queue_name = commands::queue_argument(command);
        let user_id = UserId::from(command.user.id.get().to_string());

        log::debug!(
            "/{} from {} ({:?})",
            command.data.name,
            command.user.name,
            queue_name
        );

        let reply = match kind {
            QueueCommand::Swap => match commands::swap_arguments(command) {
                Some((first, second)) => {
                    commands::swap(&self.pool, queue_name.as_deref(), first, second).await
                }
                None => commands::execute(&self.pool, kind, queue_name.as_deref(), user_id).await,
            },
            _ => commands::execute(&self.pool, kind, queue_name.as_deref(), user_id).await,
        };

        if let Err(e) = command.create_response(&ctx.http, response(&reply)).await {
            log::error!("Failed to respond to /{}: {}", command.data.name, e);
        }

        if kind.mutates() {
            self.refresh_lobby(ctx, self.pool.resolve(queue_name.as_deref()))
                .await;
        }
    }

    /// Handles the "Leave Queue" button under a lobby message.
    async fn handle_button(&self, ctx: &Context, component: &ComponentInteraction) {
        let Some(queue_name) = lobby::leave_button_queue(&component.data.custom_id) else {
            log::debug!("Ignoring component {}", component.data.custom_id);
            return;
        };

        let user_id = UserId::from(component.user.id.get().to_string());
        let reply =
            commands::execute(&self.pool, QueueCommand::Leave, Some(queue_name), user_id).await;

        if let Err(e) = component.create_response(&ctx.http, response(&reply)).await {
            log::error!("Failed to respond to leave button: {}", e);
        }

        self.refresh_lobby(ctx, queue_name).await;
    }

    async fn refresh_lobby(&self, ctx: &Context, queue_name: &str) {
        if let Some(channel) = self.lobby_channel {
            let channel = DiscordLobby::new(&ctx.http, channel);
            self.board.refresh(&channel, &self.pool, queue_name).await;
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("{} is connected to Discord!", ready.user.name);

        ctx.set_activity(Some(ActivityData::watching("debate rounds | /queue")));

        match self.guild_id.set_commands(&ctx.http, commands::register()).await {
            Ok(registered) => log::info!(
                "Registered {} commands in guild {}",
                registered.len(),
                self.guild_id
            ),
            Err(e) => log::error!("Failed to register commands: {}", e),
        }

        let Some(channel) = self.lobby_channel else {
            return;
        };
        let channel = DiscordLobby::new(&ctx.http, channel);
        self.board.clear_previous(&channel, ready.user.id).await;

        for summary in self.pool.summaries().await {
            self.board.refresh(&channel, &self.pool, &summary.name).await;
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => self.handle_command(&ctx, &command).await,
            Interaction::Component(component) => self.handle_button(&ctx, &component).await,
            _ => {}
        }
    }
}
