//! The broadcast hub: process-wide fan-out of log events to live viewers.
//!
//! The [`Hub`] holds the set of currently-subscribed viewer sessions and
//! delivers every published event to all of them in global publish order.
//! There is no backlog: a session that subscribes after an event was
//! published never receives it. Delivery is fire-and-forget — a viewer that
//! cannot keep up has events dropped rather than ever blocking a publisher.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use taplog_types::LogEvent;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Per-subscriber queue depth. 256 events absorbs normal bursts; beyond
/// that the viewer is too slow and events are dropped for it.
const SUBSCRIBER_QUEUE_DEPTH: usize = 256;

/// One viewer's subscription handle.
///
/// Dropping the receiver without calling [`Hub::unsubscribe`] is tolerated:
/// the hub prunes closed senders on the next publish.
pub struct Subscription {
    pub id: Uuid,
    pub receiver: mpsc::Receiver<LogEvent>,
}

/// The fan-out point between connection handlers and viewer sessions.
///
/// All state sits behind one short `std::sync::Mutex` that is never held
/// across an await point, so the hub is safe to share (`Arc<Hub>`) and call
/// from any task. The mutex doubles as the ordering point: concurrent
/// publishers are serialised, giving every subscriber the same global event
/// order.
#[derive(Default)]
pub struct Hub {
    subscribers: Mutex<HashMap<Uuid, mpsc::Sender<LogEvent>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::Sender<LogEvent>>> {
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("hub subscriber set lock poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Registers a new viewer session and returns its subscription.
    pub fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_DEPTH);
        self.subscribers().insert(id, tx);
        tracing::debug!(subscriber = %id, "viewer subscribed");
        Subscription { id, receiver: rx }
    }

    /// Deregisters a viewer session. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: Uuid) {
        if self.subscribers().remove(&id).is_some() {
            tracing::debug!(subscriber = %id, "viewer unsubscribed");
        }
    }

    /// Delivers `event` to every currently-subscribed viewer.
    ///
    /// Never blocks: a subscriber whose queue is full has this event
    /// dropped (with a warning); a subscriber whose receiver is gone is
    /// pruned from the set.
    pub fn publish(&self, event: &LogEvent) {
        let mut subs = self.subscribers();
        let mut closed = Vec::new();
        for (id, tx) in subs.iter() {
            match tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        subscriber = %id,
                        category = %event.category,
                        "dropping event for slow viewer"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    closed.push(*id);
                }
            }
        }
        for id in closed {
            subs.remove(&id);
            tracing::debug!(subscriber = %id, "pruned closed viewer subscription");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }
}
