use crate::error::NotifyError;
use crate::matchmaker::formed_match::FormedMatch;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Receives every match the pool forms. Called from a spawned task once the
/// queue lock has been released; a failure is logged and never undoes the
/// drain.
#[async_trait]
pub trait MatchNotifier: Send + Sync {
    fn name(&self) -> &str;

    async fn match_formed(&self, formed: &FormedMatch) -> Result<(), NotifyError>;
}

/// Fans formed matches out to in-process subscribers such as match sockets.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<FormedMatch>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        BroadcastNotifier { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormedMatch> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl MatchNotifier for BroadcastNotifier {
    fn name(&self) -> &str {
        "broadcast"
    }

    async fn match_formed(&self, formed: &FormedMatch) -> Result<(), NotifyError> {
        self.sender
            .send(formed.clone())
            .map(|_| ())
            .map_err(|_| NotifyError::NoSubscribers)
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
            vec![Assignment {
                role: String::from("Judge"),
                user_id: "A".into(),
            }],
        )
    }

    #[tokio::test]
    async fn subscribers_receive_formed_matches() {
        let notifier = BroadcastNotifier::new(8);
        let mut receiver = notifier.subscribe();

        notifier.match_formed(&formed()).await.unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.round, 1);
        assert_eq!(received.queue, "ap");
    }

    #[tokio::test]
    async fn no_subscribers_is_reported() {
        let notifier = BroadcastNotifier::new(8);

        let err = notifier.match_formed(&formed()).await.unwrap_err();

        assert!(matches!(err, NotifyError::NoSubscribers));
    }
}
