use crate::bot::embeds;
use crate::error::NotifyError;
use crate::matchmaker::formed_match::FormedMatch;
use crate::notify::MatchNotifier;
use async_trait::async_trait;
use serenity::all::{ChannelId, CreateMessage, RoleId};
use serenity::http::Http;
use std::sync::Arc;

/// Posts formed matches to the host channel, pinging the host role if one is
/// configured.
pub struct DiscordAnnouncer {
    http: Arc<Http>,
    host_channel: ChannelId,
    host_role: Option<RoleId>,
}

impl DiscordAnnouncer {
    pub fn new(http: Arc<Http>, host_channel_id: u64, host_role_id: Option<u64>) -> Self {
        DiscordAnnouncer {
            http,
            host_channel: ChannelId::new(host_channel_id),
            host_role: host_role_id.map(RoleId::new),
        }
    }

    fn content(&self, formed: &FormedMatch) -> String {
        let participants: Vec<String> = formed.participants().map(embeds::mention).collect();

        match self.host_role {
            Some(role) => format!("<@&{}> {}", role, participants.join(" ")),
            None => participants.join(" "),
        }
    }
}

#[async_trait]
impl MatchNotifier for DiscordAnnouncer {
    fn name(&self) -> &str {
        "discord"
    }

    async fn match_formed(&self, formed: &FormedMatch) -> Result<(), NotifyError> {
        let message = CreateMessage::new()
            .content(self.content(formed))
            .embed(embeds::match_embed(formed));

        let posted = self.host_channel.send_message(&self.http, message).await?;

        log::info!(
            "Announced round {} in channel {} (message {})",
            formed.round,
            self.host_channel,
            posted.id
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchmaker::formed_match::Assignment;

    fn formed() -> FormedMatch {
        FormedMatch::new(
            1,
            String::from("ap"),
            vec![
                Assignment {
                    role: String::from("Gov 1"),
                    user_id: "11".into(),
                },
                Assignment {
                    role: String::from("Judge"),
                    user_id: "12".into(),
                },
            ],
        )
    }

    #[test]
    fn content_pings_role_then_participants() {
        let announcer = DiscordAnnouncer::new(Arc::new(Http::new("token")), 1, Some(99));

        assert_eq!(announcer.content(&formed()), "<@&99> <@11> <@12>");
    }

    #[test]
    fn content_without_role_only_mentions_participants() {
        let announcer = DiscordAnnouncer::new(Arc::new(Http::new("token")), 1, None);

        assert_eq!(announcer.content(&formed()), "<@11> <@12>");
    }
}
