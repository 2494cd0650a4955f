use crate::bot::embeds;
use crate::queues::queue_pool::{QueuePool, QueueSnapshot};
use async_trait::async_trait;
use serenity::all::{
    ButtonStyle, ChannelId, CreateActionRow, CreateButton, CreateMessage, EditMessage,
    GetMessages, MessageId, UserId as DiscordUserId,
};
use serenity::http::Http;
use std::collections::HashMap;
use tokio::sync::Mutex;

const LEAVE_BUTTON: &str = "leave_queue";

/// How far back to look for lobby messages left over from a previous run.
const STALE_SCAN_LIMIT: u8 = 50;

pub fn leave_button_id(queue_name: &str) -> String {
    format!("{LEAVE_BUTTON}:{queue_name}")
}

/// Queue named by a lobby "Leave Queue" button, if `custom_id` is one.
pub fn leave_button_queue(custom_id: &str) -> Option<&str> {
    custom_id
        .strip_prefix(LEAVE_BUTTON)?
        .strip_prefix(':')
        .filter(|x| !x.is_empty())
}

fn lobby_components(queue_name: &str) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![CreateButton::new(
        leave_button_id(queue_name),
    )
    .label("Leave Queue")
    .style(ButtonStyle::Danger)])]
}

/// Where lobby messages are posted.
#[async_trait]
pub trait LobbyChannel: Send + Sync {
    async fn post(&self, snapshot: &QueueSnapshot) -> Result<MessageId, serenity::Error>;

    async fn edit(&self, message_id: MessageId, snapshot: &QueueSnapshot)
        -> Result<(), serenity::Error>;

    /// Lobby messages `author` posted before the current run.
    async fn previous_lobbies(&self, author: DiscordUserId)
        -> Result<Vec<MessageId>, serenity::Error>;

    async fn delete(&self, message_id: MessageId) -> Result<(), serenity::Error>;
}

pub struct DiscordLobby<'a> {
    http: &'a Http,
    channel: ChannelId,
}

impl<'a> DiscordLobby<'a> {
    pub fn new(http: &'a Http, channel: ChannelId) -> Self {
        DiscordLobby { http, channel }
    }
}

#[async_trait]
impl<'a> LobbyChannel for DiscordLobby<'a> {
    async fn post(&self, snapshot: &QueueSnapshot) -> Result<MessageId, serenity::Error> {
        let message = CreateMessage::new()
            .embed(embeds::lobby_embed(snapshot))
            .components(lobby_components(&snapshot.name));

        let posted = self.channel.send_message(self.http, message).await?;
        Ok(posted.id)
    }

    async fn edit(
        &self,
        message_id: MessageId,
        snapshot: &QueueSnapshot,
    ) -> Result<(), serenity::Error> {
        let edit = EditMessage::new()
            .embed(embeds::lobby_embed(snapshot))
            .components(lobby_components(&snapshot.name));

        self.channel.edit_message(self.http, message_id, edit).await?;
        Ok(())
    }

    async fn previous_lobbies(
        &self,
        author: DiscordUserId,
    ) -> Result<Vec<MessageId>, serenity::Error> {
        let recent = self
            .channel
            .messages(self.http, GetMessages::new().limit(STALE_SCAN_LIMIT))
            .await?;

        Ok(recent
            .into_iter()
            .filter(|x| x.author.id == author)
            .filter(|x| {
                x.embeds
                    .iter()
                    .any(|e| e.title.as_deref().is_some_and(embeds::is_lobby_title))
            })
            .map(|x| x.id)
            .collect())
    }

    async fn delete(&self, message_id: MessageId) -> Result<(), serenity::Error> {
        self.channel.delete_message(self.http, message_id).await
    }
}

/// Keeps one lobby message per queue up to date in the lobby channel.
#[derive(Default)]
pub struct LobbyBoard {
    messages: Mutex<HashMap<String, MessageId>>,
}

impl LobbyBoard {
    pub fn new() -> Self {
        LobbyBoard::default()
    }

    /// Removes lobby messages left behind by an earlier run so each queue
    /// ends up with a single lobby.
    pub async fn clear_previous<C: LobbyChannel>(&self, channel: &C, author: DiscordUserId) {
        let mut messages = self.messages.lock().await;
        messages.clear();

        let stale = match channel.previous_lobbies(author).await {
            Ok(stale) => stale,
            Err(e) => {
                log::warn!("Failed to look up previous lobby messages: {}", e);
                return;
            }
        };

        for message_id in stale {
            if let Err(e) = channel.delete(message_id).await {
                log::warn!("Failed to delete lobby message {}: {}", message_id, e);
            }
        }
    }

    /// Edits the lobby message for a queue, or posts a new one if it was never
    /// sent or has since been deleted. The queue is read while the board is
    /// held so a slower refresh never overwrites a newer one.
    pub async fn refresh<C: LobbyChannel>(&self, channel: &C, pool: &QueuePool, queue_name: &str) {
        let mut messages = self.messages.lock().await;

        let snapshot = match pool.snapshot(queue_name).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::debug!("Skipping lobby refresh: {}", e);
                return;
            }
        };

        if let Some(message_id) = messages.get(&snapshot.name).copied() {
            match channel.edit(message_id, &snapshot).await {
                Ok(()) => return,
                Err(e) => {
                    log::warn!("Lobby message for {} is gone, reposting: {}", snapshot.name, e);
                    messages.remove(&snapshot.name);
                }
            }
        }

        match channel.post(&snapshot).await {
            Ok(message_id) => {
                messages.insert(snapshot.name.clone(), message_id);
            }
            Err(e) => {
                log::error!("Failed to post lobby for {}: {}", snapshot.name, e);
            }
        }
    }
}
