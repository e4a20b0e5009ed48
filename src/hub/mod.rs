use crate::pipeline::classifier::SwipeEvent;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Live subscriber set with best-effort fan-out.
///
/// Each subscriber owns the receiving half of an unbounded channel; the
/// connection task forwards it to the socket, which keeps per-subscriber
/// delivery ordered. A subscriber whose receiver is gone is pruned during
/// `publish` without affecting the rest.
pub struct BroadcastHub {
    subscribers: Mutex<HashMap<Uuid, mpsc::UnboundedSender<SwipeEvent>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<SwipeEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().insert(id, tx);
        (id, rx)
    }

    /// Removing an absent subscriber is a no-op.
    pub fn unregister(&self, id: Uuid) {
        self.subscribers.lock().unwrap().remove(&id);
    }

    /// Sends the event to every currently registered subscriber. Returns
    /// the number of successful deliveries.
    pub fn publish(&self, event: SwipeEvent) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap();
        let mut dead = Vec::new();
        let mut delivered = 0;
        for (id, tx) in subscribers.iter() {
            if tx.send(event).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            debug!("Subscriber {} gone, pruning during publish", id);
            subscribers.remove(&id);
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_every_live_subscriber() {
        let hub = BroadcastHub::new();
        let (_a_id, mut a_rx) = hub.register();
        let (_b_id, mut b_rx) = hub.register();

        assert_eq!(hub.publish(SwipeEvent::Right), 2);
        assert_eq!(a_rx.recv().await, Some(SwipeEvent::Right));
        assert_eq!(b_rx.recv().await, Some(SwipeEvent::Right));
    }

    #[tokio::test]
    async fn dead_subscriber_is_pruned_and_others_still_receive() {
        let hub = BroadcastHub::new();
        let (_a_id, mut a_rx) = hub.register();
        let (_b_id, b_rx) = hub.register();
        drop(b_rx);

        assert_eq!(hub.publish(SwipeEvent::Left), 1);
        assert_eq!(a_rx.recv().await, Some(SwipeEvent::Left));
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let hub = BroadcastHub::new();
        let (id, _rx) = hub.register();
        hub.unregister(id);
        hub.unregister(id);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn unregistered_subscriber_receives_nothing_further() {
        let hub = BroadcastHub::new();
        let (id, mut rx) = hub.register();
        hub.unregister(id);
        assert_eq!(hub.publish(SwipeEvent::Left), 0);
        // Sender side is dropped by unregister, so the channel reports closed.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn delivery_order_matches_publish_order() {
        let hub = BroadcastHub::new();
        let (_id, mut rx) = hub.register();
        hub.publish(SwipeEvent::Left);
        hub.publish(SwipeEvent::Right);
        hub.publish(SwipeEvent::Left);
        assert_eq!(rx.recv().await, Some(SwipeEvent::Left));
        assert_eq!(rx.recv().await, Some(SwipeEvent::Right));
        assert_eq!(rx.recv().await, Some(SwipeEvent::Left));
    }
}
