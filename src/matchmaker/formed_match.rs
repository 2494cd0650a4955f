use crate::error::QueueError;
use crate::queues::queue_entry::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub role: String,
    pub user_id: UserId,
}

/// A drafted, role-assigned group handed to the match notifiers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormedMatch {
    pub id: Uuid,
    pub round: u64,
    pub queue: String,
    pub assignments: Vec<Assignment>,
    pub formed_at: DateTime<Utc>,
}

impl FormedMatch {
    pub fn new(round: u64, queue: String, assignments: Vec<Assignment>) -> Self {
        FormedMatch {
            id: Uuid::new_v4(),
            round,
            queue,
            assignments,
            formed_at: Utc::now(),
        }
    }

    pub fn participants(&self) -> impl Iterator<Item = &UserId> {
        self.assignments.iter().map(|x| &x.user_id)
    }

    fn seat_of(&self, user_id: &UserId) -> Result<usize, QueueError> {
        self.assignments
            .iter()
            .position(|x| &x.user_id == user_id)
            .ok_or_else(|| QueueError::NotInRound {
                round: self.round,
                user: user_id.clone(),
            })
    }

    /// Exchanges the roles of two participants. Nothing changes unless both
    /// are part of the round.
    pub fn swap(&mut self, first: &UserId, second: &UserId) -> Result<(), QueueError> {
        let a = self.seat_of(first)?;
        let b = self.seat_of(second)?;

        if a != b {
            let user = self.assignments[a].user_id.clone();
            self.assignments[a].user_id = self.assignments[b].user_id.clone();
            self.assignments[b].user_id = user;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formed() -> FormedMatch {
        let assignments = [("Gov 1", "A"), ("Opp 1", "B"), ("Judge", "C")]
            .into_iter()
            .map(|(role, user)| Assignment {
                role: role.to_string(),
                user_id: UserId::from(user),
            })
            .collect();
        FormedMatch::new(4, String::from("ap"), assignments)
    }

    fn seats(formed: &FormedMatch) -> Vec<(&str, &str)> {
        formed
            .assignments
            .iter()
            .map(|x| (x.role.as_str(), x.user_id.as_str()))
            .collect()
    }

    #[test]
    fn swap_exchanges_roles() {
        let mut formed = formed();

        formed.swap(&"A".into(), &"C".into()).unwrap();

        assert_eq!(
            seats(&formed),
            vec![("Gov 1", "C"), ("Opp 1", "B"), ("Judge", "A")]
        );
    }

    #[test]
    fn swap_with_outsider_changes_nothing() {
        let mut formed = formed();

        let err = formed.swap(&"A".into(), &"Z".into()).unwrap_err();

        assert_eq!(
            err,
            QueueError::NotInRound {
                round: 4,
                user: UserId::from("Z"),
            }
        );
        assert_eq!(
            seats(&formed),
            vec![("Gov 1", "A"), ("Opp 1", "B"), ("Judge", "C")]
        );
    }

    #[test]
    fn swap_with_self_is_a_no_op() {
        let mut formed = formed();

        formed.swap(&"B".into(), &"B".into()).unwrap();

        assert_eq!(seats(&formed)[1], ("Opp 1", "B"));
    }
}
