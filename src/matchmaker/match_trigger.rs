use crate::error::{ConfigError, QueueError};
use crate::matchmaker::formed_match::Assignment;
use crate::matchmaker::roles::RoleList;
use crate::queues::queue_store::QueueStore;

/// Forms a match when a queue reaches its required size.
///
/// `check` must run in the same critical section as the join that preceded
/// it, otherwise two joins could both observe a full queue and drain twice.
#[derive(Debug, Clone)]
pub struct MatchTrigger {
    required_size: usize,
    roles: RoleList,
}

impl MatchTrigger {
    pub fn new(required_size: usize, roles: RoleList) -> Result<Self, ConfigError> {
        if required_size == 0 {
            return Err(ConfigError::InvalidQueue(String::from(
                "required size must be at least 1",
            )));
        }
        if roles.len() != required_size {
            return Err(ConfigError::InvalidQueue(format!(
                "{} roles configured for a required size of {}",
                roles.len(),
                required_size
            )));
        }

        Ok(MatchTrigger {
            required_size,
            roles,
        })
    }

    pub fn required_size(&self) -> usize {
        self.required_size
    }

    pub fn roles(&self) -> &RoleList {
        &self.roles
    }

    /// Drafts one match if the queue is full. Entries past the threshold stay
    /// queued for the next match.
    pub fn check(
        &self,
        store: &mut QueueStore,
        queue_name: &str,
    ) -> Result<Option<Vec<Assignment>>, QueueError> {
        if store.size(queue_name)? < self.required_size {
            return Ok(None);
        }

        let drafted = store.drain(queue_name, self.required_size)?;

        let assignments = self
            .roles
            .iter()
            .zip(drafted)
            .map(|(role, entry)| Assignment {
                role: role.clone(),
                user_id: entry.user_id,
            })
            .collect();

        Ok(Some(assignments))
    }
}
