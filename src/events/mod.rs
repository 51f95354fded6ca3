use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted by the services after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    MemberRegistered(Uuid),
    OrderCreated(Uuid),
    OrderCancelled(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::MemberRegistered(id) => info!(member_id = %id, "member registered"),
            Event::OrderCreated(id) => info!(order_id = %id, "order created"),
            Event::OrderCancelled(id) => info!(order_id = %id, "order cancelled"),
        }
    }
    info!("event channel closed, processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_round_trip_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender.send(Event::OrderCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(received)) => assert_eq!(received, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sender = EventSender::new(tx);
        assert!(sender.send(Event::MemberRegistered(Uuid::new_v4())).await.is_err());
    }
}
