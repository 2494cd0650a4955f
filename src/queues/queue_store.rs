use crate::error::QueueError;
use crate::queues::queue::Queue;
use crate::queues::queue_entry::{QueueEntry, UserId};
use std::collections::HashMap;

/// Pending join requests for every registered queue.
///
/// Queue names are case-insensitive. A store is a plain owned value; callers
/// that share it across tasks wrap it in a lock (see `QueuePool`).
#[derive(Debug, Default)]
pub struct QueueStore {
    queues: HashMap<String, Queue>,
    order: Vec<String>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty queue. Returns false if the name is already taken.
    pub fn register(&mut self, name: &str) -> bool {
        let key = normalize(name);
        if self.queues.contains_key(&key) {
            return false;
        }

        self.queues.insert(key.clone(), Queue::new(key.clone()));
        self.order.push(key);
        true
    }

    pub fn join(&mut self, queue_name: &str, user_id: UserId) -> Result<(), QueueError> {
        let queue = self.queue_mut(queue_name)?;
        queue.add_player(QueueEntry::new(user_id))
    }

    pub fn leave(&mut self, queue_name: &str, user_id: &UserId) -> Result<(), QueueError> {
        let queue = self.queue_mut(queue_name)?;
        queue.remove_player(user_id)?;
        Ok(())
    }

    pub fn size(&self, queue_name: &str) -> Result<usize, QueueError> {
        Ok(self.queue(queue_name)?.len())
    }

    /// Removes and returns the first `count` entries of the queue in order.
    pub fn drain(&mut self, queue_name: &str, count: usize) -> Result<Vec<QueueEntry>, QueueError> {
        self.queue_mut(queue_name)?.take_front(count)
    }

    pub fn position(&self, queue_name: &str, user_id: &UserId) -> Result<Option<usize>, QueueError> {
        Ok(self.queue(queue_name)?.position_of(user_id))
    }

    pub fn clear(&mut self, queue_name: &str) -> Result<usize, QueueError> {
        Ok(self.queue_mut(queue_name)?.clear())
    }

    pub fn entries(&self, queue_name: &str) -> Result<&[QueueEntry], QueueError> {
        Ok(&self.queue(queue_name)?.in_queue)
    }

    /// Registered queue names in registration order.
    pub fn queue_names(&self) -> &[String] {
        &self.order
    }

    pub fn queue_exists(&self, queue_name: &str) -> bool {
        self.queues.contains_key(&normalize(queue_name))
    }

    fn queue(&self, queue_name: &str) -> Result<&Queue, QueueError> {
        self.queues
            .get(&normalize(queue_name))
            .ok_or_else(|| QueueError::UnknownQueue(queue_name.to_string()))
    }

    fn queue_mut(&mut self, queue_name: &str) -> Result<&mut Queue, QueueError> {
        self.queues
            .get_mut(&normalize(queue_name))
            .ok_or_else(|| QueueError::UnknownQueue(queue_name.to_string()))
    }
}

pub(crate) fn normalize(queue_name: &str) -> String {
    queue_name.trim().to_lowercase()
}
