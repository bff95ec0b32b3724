//! # Change Notification
//!
//! One [`StoreEvent`] per successful command, delivered over a tokio
//! broadcast channel.
//!
//! ```text
//! command ──► state mutated ──► events.send(StoreEvent) ──► durable write
//!                                     │
//!                     ┌───────────────┼───────────────┐
//!                     ▼               ▼               ▼
//!               Subscription    Subscription    Subscription
//! ```
//!
//! A subscriber that falls more than the channel capacity behind skips the
//! missed events and keeps receiving; each event only says *what* changed,
//! so re-reading the store catches it up.

use tokio::sync::broadcast;
use tracing::warn;

use hearth_core::LedgerKind;

/// Capacity of the broadcast channel.
pub(crate) const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Item added, edited, removed, or the catalog reset.
    CatalogChanged,

    ShiftStarted { shift_id: String },

    ShiftEnded { shift_id: String, report_id: String },

    /// An entry was added, collapsed or removed.
    LedgerChanged { shift_id: String, kind: LedgerKind },

    /// Ending counts were set, cleared or prefilled.
    EndingInventoryChanged { shift_id: String },
}

/// A live subscription to store changes.
///
/// Dropping it, or calling [`Subscription::unsubscribe`], ends it.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<StoreEvent>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<StoreEvent>) -> Self {
        Subscription { rx }
    }

    /// Waits for the next event. `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Subscriber lagged behind store events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The next event if one is already waiting.
    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Subscriber lagged behind store events");
                }
                Err(_) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_receiving() {
        let (tx, rx) = broadcast::channel(2);
        let mut sub = Subscription::new(rx);

        for _ in 0..5 {
            tx.send(StoreEvent::CatalogChanged).unwrap();
        }
        tx.send(StoreEvent::ShiftStarted {
            shift_id: "s2".to_string(),
        })
        .unwrap();

        // The oldest events were dropped; the latest ones still arrive
        assert_eq!(sub.recv().await, Some(StoreEvent::CatalogChanged));
        assert_eq!(
            sub.recv().await,
            Some(StoreEvent::ShiftStarted {
                shift_id: "s2".to_string()
            })
        );
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn test_closed_channel_ends_subscription() {
        let (tx, rx) = broadcast::channel(4);
        let mut sub = Subscription::new(rx);
        drop(tx);
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn test_unsubscribe_drops_receiver() {
        let (tx, rx) = broadcast::channel::<StoreEvent>(4);
        let sub = Subscription::new(rx);
        assert_eq!(tx.receiver_count(), 1);
        sub.unsubscribe();
        assert_eq!(tx.receiver_count(), 0);
    }
}
