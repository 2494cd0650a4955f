use crate::bot::embeds;
use crate::error::QueueError;
use crate::matchmaker::formed_match::FormedMatch;
use crate::queues::queue_entry::UserId;
use crate::queues::queue_pool::{QueuePool, QueueSnapshot};
use serenity::all::{
    CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed,
    Permissions, ResolvedValue,
};

const QUEUE_OPTION: &str = "name";
const FIRST_OPTION: &str = "first";
const SECOND_OPTION: &str = "second";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCommand {
    Join,
    Leave,
    Lobby,
    Clear,
    Swap,
}

impl QueueCommand {
    pub fn from_name(name: &str) -> Option<QueueCommand> {
        match name {
            "queue" => Some(QueueCommand::Join),
            "leave" => Some(QueueCommand::Leave),
            "lobby" => Some(QueueCommand::Lobby),
            "clearqueue" => Some(QueueCommand::Clear),
            "swap" => Some(QueueCommand::Swap),
            _ => None,
        }
    }

    /// Whether a successful run changes the queue contents.
    pub fn mutates(&self) -> bool {
        !matches!(self, QueueCommand::Lobby | QueueCommand::Swap)
    }
}

fn queue_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, QUEUE_OPTION, description).required(false)
}

/// Slash commands registered on the configured guild.
pub fn register() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("queue")
            .description("Join the matchmaking queue for a debate round")
            .add_option(queue_option("Queue to join")),
        CreateCommand::new("leave")
            .description("Leave the matchmaking queue")
            .add_option(queue_option("Queue to leave")),
        CreateCommand::new("lobby")
            .description("Show who is waiting in the matchmaking queue")
            .add_option(queue_option("Queue to show")),
        CreateCommand::new("clearqueue")
            .description("Clear the entire matchmaking queue (Admin only)")
            .default_member_permissions(Permissions::ADMINISTRATOR)
            .add_option(queue_option("Queue to clear")),
        CreateCommand::new("swap")
            .description("Swap two members of the latest round (Admin only)")
            .default_member_permissions(Permissions::ADMINISTRATOR)
            .add_option(
                CreateCommandOption::new(CommandOptionType::User, FIRST_OPTION, "First member")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::User, SECOND_OPTION, "Second member")
                    .required(true),
            )
            .add_option(queue_option("Queue the round was drafted from")),
    ]
}

pub fn queue_argument(command: &CommandInteraction) -> Option<String> {
    command
        .data
        .options()
        .into_iter()
        .find(|x| x.name == QUEUE_OPTION)
        .and_then(|x| match x.value {
            ResolvedValue::String(value) => Some(value.to_string()),
            _ => None,
        })
}

fn user_argument(command: &CommandInteraction, name: &str) -> Option<UserId> {
    command
        .data
        .options()
        .into_iter()
        .find(|x| x.name == name)
        .and_then(|x| match x.value {
            ResolvedValue::User(user, _) => Some(UserId::from(user.id.get().to_string())),
            _ => None,
        })
}

/// The two members named by `/swap`.
pub fn swap_arguments(command: &CommandInteraction) -> Option<(UserId, UserId)> {
    Some((
        user_argument(command, FIRST_OPTION)?,
        user_argument(command, SECOND_OPTION)?,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct CommandReply {
    pub tone: Tone,
    pub title: String,
    pub description: String,
    pub lobby: Option<QueueSnapshot>,
    pub allocation: Option<FormedMatch>,
}

impl CommandReply {
    fn success(title: &str, description: String) -> Self {
        CommandReply {
            tone: Tone::Success,
            title: title.to_string(),
            description,
            lobby: None,
            allocation: None,
        }
    }

    fn failure(title: &str, description: String) -> Self {
        CommandReply {
            tone: Tone::Failure,
            title: title.to_string(),
            description,
            lobby: None,
            allocation: None,
        }
    }

    /// Revised allocations are shown to the whole channel.
    pub fn is_public(&self) -> bool {
        self.allocation.is_some()
    }

    pub fn embed(&self) -> CreateEmbed {
        if let Some(formed) = &self.allocation {
            return embeds::match_embed(formed);
        }

        match (&self.lobby, self.tone) {
            (Some(snapshot), _) => embeds::lobby_embed(snapshot),
            (None, Tone::Success) => embeds::success_embed(&self.title, &self.description),
            (None, Tone::Failure) => embeds::error_embed(&self.title, &self.description),
        }
    }
}

/// Runs a queue command for a user and describes the outcome. `/swap` goes
/// through [`swap`] instead since it names two other members.
pub async fn execute(
    pool: &QueuePool,
    command: QueueCommand,
    queue_name: Option<&str>,
    user_id: UserId,
) -> CommandReply {
    let queue_name = pool.resolve(queue_name);

    let result = match command {
        QueueCommand::Join => join(pool, queue_name, user_id).await,
        QueueCommand::Leave => pool.leave(queue_name, &user_id).await.map(|_| {
            CommandReply::success(
                "Left Queue",
                String::from("You have been removed from the queue."),
            )
        }),
        QueueCommand::Lobby => pool.snapshot(queue_name).await.map(|snapshot| CommandReply {
            lobby: Some(snapshot),
            ..CommandReply::success("Lobby", String::new())
        }),
        QueueCommand::Clear => pool.clear(queue_name).await.map(|removed| {
            CommandReply::success(
                "Queue Cleared",
                format!("The matchmaking queue has been cleared ({removed} removed)."),
            )
        }),
        QueueCommand::Swap => Ok(CommandReply::failure(
            "Missing Members",
            String::from("Name the two members to swap."),
        )),
    };

    match result {
        Ok(reply) => reply,
        Err(err) => failure_reply(pool, err).await,
    }
}

pub async fn swap(
    pool: &QueuePool,
    queue_name: Option<&str>,
    first: UserId,
    second: UserId,
) -> CommandReply {
    let queue_name = pool.resolve(queue_name);

    match pool.swap(queue_name, &first, &second).await {
        Ok(formed) => CommandReply {
            allocation: Some(formed),
            ..CommandReply::success(
                "Members Swapped",
                format!(
                    "Swapped {} and {}",
                    embeds::mention(&first),
                    embeds::mention(&second)
                ),
            )
        },
        Err(err) => failure_reply(pool, err).await,
    }
}

async fn join(pool: &QueuePool, queue_name: &str, user_id: UserId) -> Result<CommandReply, QueueError> {
    let receipt = pool.join(queue_name, user_id.clone()).await?;

    let Some(formed) = receipt.formed else {
        return Ok(CommandReply::success(
            "Joined Queue",
            format!(
                "You have been added to the queue. Position: {}",
                receipt.position
            ),
        ));
    };

    let seat = formed
        .assignments
        .iter()
        .find(|x| x.user_id == user_id)
        .map(|x| x.role.clone())
        .unwrap_or_default();

    Ok(CommandReply::success(
        "Round Ready",
        format!(
            "You completed round {}! You are seated as **{}**. Check the host channel for the full allocation.",
            formed.round, seat
        ),
    ))
}

async fn failure_reply(pool: &QueuePool, err: QueueError) -> CommandReply {
    match err {
        QueueError::AlreadyQueued { .. } => CommandReply::failure(
            "Already in Queue",
            String::from("You are already in the matchmaking queue."),
        ),
        QueueError::NotQueued { .. } => CommandReply::failure(
            "Not in Queue",
            String::from("You are not in the matchmaking queue."),
        ),
        QueueError::UnknownQueue(name) => {
            let available: Vec<String> = pool
                .summaries()
                .await
                .into_iter()
                .map(|x| format!("`{}`", x.name))
                .collect();
            CommandReply::failure(
                "Unknown Queue",
                format!(
                    "There is no queue named `{}`. Available queues: {}",
                    name,
                    available.join(", ")
                ),
            )
        }
        QueueError::NoRound(name) => CommandReply::failure(
            "No Round",
            format!("No round has been formed from `{name}` yet."),
        ),
        QueueError::NotInRound { round, user } => CommandReply::failure(
            "Not in Round",
            format!("{} is not part of round {}.", embeds::mention(&user), round),
        ),
        err @ QueueError::InsufficientEntries { .. } => {
            log::error!("Unexpected queue failure: {}", err);
            CommandReply::failure(
                "Error",
                String::from("An error occurred while processing this command."),
            )
        }
    }
}
