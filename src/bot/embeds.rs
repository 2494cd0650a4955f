use crate::matchmaker::formed_match::FormedMatch;
use crate::matchmaker::roles::Bench;
use crate::queues::queue_entry::UserId;
use crate::queues::queue_pool::QueueSnapshot;
use serenity::all::{CreateEmbed, CreateEmbedFooter, Timestamp};

pub const COLOR_PRIMARY: u32 = 0x5865F2;
pub const COLOR_SUCCESS: u32 = 0x57F287;
pub const COLOR_WARNING: u32 = 0xFEE75C;
pub const COLOR_DANGER: u32 = 0xED4245;

const LOBBY_TITLE_SUFFIX: &str = "Debate Lobby";

pub fn mention(user_id: &UserId) -> String {
    format!("<@{}>", user_id)
}

pub fn success_embed(title: &str, description: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("✅ {title}"))
        .description(description)
        .color(COLOR_SUCCESS)
}

pub fn error_embed(title: &str, description: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("❌ {title}"))
        .description(description)
        .color(COLOR_DANGER)
}

/// Numbered list of queued users, or a hint when nobody is waiting.
pub fn lobby_lines(snapshot: &QueueSnapshot) -> String {
    if snapshot.entries.is_empty() {
        return String::from("*No one in queue*\nUse `/queue` to join!");
    }

    snapshot
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}", i + 1, mention(&entry.user_id)))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn progress_line(size: usize, required_size: usize) -> String {
    let missing = required_size.saturating_sub(size);
    if missing == 0 {
        format!("**{size}/{required_size}** players, a round is ready")
    } else {
        format!("**{size}/{required_size}** players, {missing} more needed")
    }
}

pub fn is_lobby_title(title: &str) -> bool {
    title.ends_with(LOBBY_TITLE_SUFFIX)
}

pub fn lobby_embed(snapshot: &QueueSnapshot) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!(
            "🎭 {} {LOBBY_TITLE_SUFFIX}",
            snapshot.name.to_uppercase()
        ))
        .description("Join the queue to participate in a debate round!")
        .color(COLOR_PRIMARY)
        .field(
            format!("Queued Users ({})", snapshot.entries.len()),
            lobby_lines(snapshot),
            false,
        )
        .field(
            "Progress",
            progress_line(snapshot.entries.len(), snapshot.required_size),
            false,
        )
        .footer(CreateEmbedFooter::new(
            "Use /queue to join • Use /leave to exit queue",
        ))
}

/// Groups assignments by bench, keeping drafting order inside each group.
pub fn bench_fields(formed: &FormedMatch) -> Vec<(&'static str, String)> {
    let mut fields: Vec<(&'static str, String)> = Vec::new();

    for bench in [Bench::Government, Bench::Opposition, Bench::Adjudication] {
        let lines: Vec<String> = formed
            .assignments
            .iter()
            .filter(|x| Bench::of(&x.role) == bench)
            .map(|x| format!("**{}**: {}", x.role, mention(&x.user_id)))
            .collect();

        if !lines.is_empty() {
            fields.push((bench.title(), lines.join("\n")));
        }
    }

    fields
}

pub fn match_embed(formed: &FormedMatch) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("🔔 Round {} is ready!", formed.round))
        .description(format!(
            "{} players were drafted from the **{}** queue.",
            formed.assignments.len(),
            formed.queue
        ))
        .color(COLOR_WARNING);

    for (title, value) in bench_fields(formed) {
        embed = embed.field(title, value, true);
    }

    if let Ok(timestamp) = Timestamp::from_unix_timestamp(formed.formed_at.timestamp()) {
        embed = embed.timestamp(timestamp);
    }

    embed.footer(CreateEmbedFooter::new(format!("Match {}", formed.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchmaker::formed_match::Assignment;
    use crate::queues::queue_entry::QueueEntry;

    fn snapshot(ids: &[&str]) -> QueueSnapshot {
        QueueSnapshot {
            name: String::from("ap"),
            required_size: 7,
            roles: Vec::new(),
            entries: ids.iter().map(|x| QueueEntry::new(UserId::from(*x))).collect(),
        }
    }

    #[test]
    fn lobby_lists_users_in_order() {
        assert_eq!(lobby_lines(&snapshot(&["1", "2"])), "1. <@1>\n2. <@2>");
        assert!(lobby_lines(&snapshot(&[])).contains("No one in queue"));
    }

    #[test]
    fn recognises_lobby_titles() {
        assert!(is_lobby_title("🎭 AP Debate Lobby"));
        assert!(!is_lobby_title("🔔 Round 2 is ready!"));
    }

    #[test]
    fn progress_reports_missing_players() {
        assert_eq!(progress_line(5, 7), "**5/7** players, 2 more needed");
        assert_eq!(progress_line(7, 7), "**7/7** players, a round is ready");
    }

    #[test]
    fn assignments_are_grouped_by_bench() {
        let assignments = ["Gov 1", "Opp 1", "Gov 2", "Judge"]
            .iter()
            .enumerate()
            .map(|(i, role)| Assignment {
                role: role.to_string(),
                user_id: UserId::from(i.to_string()),
            })
            .collect();
        let formed = FormedMatch::new(3, String::from("ap"), assignments);

        let fields = bench_fields(&formed);

        assert_eq!(
            fields,
            vec![
                ("Government", String::from("**Gov 1**: <@0>\n**Gov 2**: <@2>")),
                ("Opposition", String::from("**Opp 1**: <@1>")),
                ("Adjudication", String::from("**Judge**: <@3>")),
            ]
        );
    }
}
