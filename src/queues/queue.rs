use super::queue_entry::{QueueEntry, UserId};
use crate::error::QueueError;
use serde::Serialize;
use std::collections::HashSet;

/// An ordered waiting line. Insertion order is drafting order.
#[derive(Debug, Clone, Serialize)]
pub struct Queue {
    pub name: String,
    pub in_queue: Vec<QueueEntry>,
    #[serde(skip_serializing)]
    players: HashSet<UserId>,
}

impl Queue {
    pub fn new(name: String) -> Self {
        Queue {
            name,
            in_queue: Vec::new(),
            players: HashSet::new(),
        }
    }

    pub fn add_player(&mut self, queue_entry: QueueEntry) -> Result<(), QueueError> {
        if self.players.contains(&queue_entry.user_id) {
            return Err(QueueError::AlreadyQueued {
                queue: self.name.clone(),
                user: queue_entry.user_id,
            });
        }

        self.players.insert(queue_entry.user_id.clone());
        self.in_queue.push(queue_entry);

        Ok(())
    }

    pub fn remove_player(&mut self, user_id: &UserId) -> Result<QueueEntry, QueueError> {
        if let Some(index) = self.in_queue.iter().position(|x| &x.user_id == user_id) {
            let entry = self.in_queue.remove(index);
            self.players.remove(&entry.user_id);

            Ok(entry)
        } else {
            Err(QueueError::NotQueued {
                queue: self.name.clone(),
                user: user_id.clone(),
            })
        }
    }

    /// Removes the first `count` entries, or nothing at all if fewer are queued.
    pub fn take_front(&mut self, count: usize) -> Result<Vec<QueueEntry>, QueueError> {
        if self.in_queue.len() < count {
            return Err(QueueError::InsufficientEntries {
                queue: self.name.clone(),
                requested: count,
                available: self.in_queue.len(),
            });
        }

        let drafted: Vec<QueueEntry> = self.in_queue.drain(..count).collect();
        for entry in &drafted {
            self.players.remove(&entry.user_id);
        }

        Ok(drafted)
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.in_queue.len();
        self.in_queue.clear();
        self.players.clear();
        removed
    }

    pub fn position_of(&self, user_id: &UserId) -> Option<usize> {
        if !self.players.contains(user_id) {
            return None;
        }

        self.in_queue
            .iter()
            .position(|x| &x.user_id == user_id)
            .map(|index| index + 1)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.players.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.in_queue.len()
    }
}
