use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn { user_id: Uuid },
    SignedOut { user_id: Uuid },
    TokenRefreshed { user_id: Uuid },
}

#[derive(Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Dropped silently when nobody is listening.
    pub fn publish(&self, event: AuthEvent) {
        let _ = self.tx.send(event);
    }
}

/// Logs every session change until the channel closes.
pub async fn log_auth_events(mut rx: broadcast::Receiver<AuthEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => tracing::info!(?event, "Session changed"),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Auth event listener lagged, skipped {} events", n)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_published_events() {
        let events = AuthEvents::new(8);
        let mut rx = events.subscribe();
        let user_id = Uuid::new_v4();

        events.publish(AuthEvent::SignedIn { user_id });
        events.publish(AuthEvent::SignedOut { user_id });

        assert_eq!(rx.recv().await.unwrap(), AuthEvent::SignedIn { user_id });
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::SignedOut { user_id });
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        AuthEvents::new(1).publish(AuthEvent::TokenRefreshed {
            user_id: Uuid::new_v4(),
        });
    }
}
