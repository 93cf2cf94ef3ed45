use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::debug;

use cairn_types::TrailId;

use crate::event::{EventKind, LedgerEvent};

/// Filter for subscribing to a subset of ledger events.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// If set, only events of these kinds are delivered.
    pub kinds: Option<Vec<EventKind>>,
    /// If set, only events pertaining to this trail are delivered.
    pub trail: Option<TrailId>,
    /// If set, only events at or above this height are delivered.
    pub min_height: Option<u64>,
}

impl EventFilter {
    /// Returns `true` if the given event matches this filter.
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }
        if let Some(ref trail) = self.trail {
            if event.payload.trail() != Some(*trail) {
                return false;
            }
        }
        if let Some(min) = self.min_height {
            if event.height < min {
                return false;
            }
        }
        true
    }
}

/// A broadcast receiver for ledger events.
pub type EventStream = broadcast::Receiver<LedgerEvent>;

struct Subscriber {
    filter: EventFilter,
    sender: broadcast::Sender<LedgerEvent>,
}

/// Fan-out bus delivering events to matching subscribers.
///
/// Publishing is synchronous and fire-and-forget: a slow or dropped
/// subscriber never blocks the mutation path. Subscribers whose channels
/// are closed are pruned on the next publish.
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
    channel_capacity: usize,
}

impl EventBus {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            channel_capacity,
        }
    }

    /// Register a subscriber; returns a receiver for matching events.
    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        let (tx, rx) = broadcast::channel(self.channel_capacity);
        self.subscribers
            .write()
            .expect("bus lock poisoned")
            .push(Subscriber { filter, sender: tx });
        rx
    }

    /// Deliver an event to all matching subscribers, pruning stale ones.
    pub fn publish(&self, event: &LedgerEvent) {
        let mut subs = self.subscribers.write().expect("bus lock poisoned");
        let before = subs.len();
        subs.retain(|sub| {
            if sub.filter.matches(event) {
                // A failed send means no receivers remain.
                sub.sender.send(event.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });
        if subs.len() < before {
            debug!(pruned = before - subs.len(), "pruned stale subscribers");
        }
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().expect("bus lock poisoned").len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use cairn_types::SegmentId;

    use crate::event::EventPayload;

    use super::*;

    fn sealed_event(height: u64) -> LedgerEvent {
        LedgerEvent::new(
            height,
            EventPayload::SegmentSealed {
                segment: SegmentId::derive(b"bus"),
                sealed_count: 1,
            },
        )
    }

    fn frozen_event(height: u64) -> LedgerEvent {
        LedgerEvent::new(height, EventPayload::LedgerFrozen { total_segments: 9 })
    }

    #[test]
    fn subscriber_receives_matching_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe(EventFilter::default());

        bus.publish(&sealed_event(100));
        let received = rx.try_recv().unwrap();
        assert_eq!(received.kind, EventKind::SegmentSealed);
        assert!(received.verify_integrity());
    }

    #[test]
    fn kind_filter_excludes_other_kinds() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe(EventFilter {
            kinds: Some(vec![EventKind::LedgerFrozen]),
            ..Default::default()
        });

        bus.publish(&sealed_event(100));
        assert!(rx.try_recv().is_err());

        bus.publish(&frozen_event(101));
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::LedgerFrozen);
    }

    #[test]
    fn trail_filter_matches_payload() {
        let trail = TrailId::from_name("ridge");
        let bus = EventBus::default();
        let mut rx = bus.subscribe(EventFilter {
            trail: Some(trail),
            ..Default::default()
        });

        bus.publish(&sealed_event(100));
        assert!(rx.try_recv().is_err());

        bus.publish(&LedgerEvent::new(101, EventPayload::TrailLocked { trail }));
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::TrailLocked);
    }

    #[test]
    fn min_height_filter() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe(EventFilter {
            min_height: Some(150),
            ..Default::default()
        });

        bus.publish(&sealed_event(100));
        assert!(rx.try_recv().is_err());
        bus.publish(&sealed_event(150));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let bus = EventBus::default();
        let rx = bus.subscribe(EventFilter::default());
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx);
        bus.publish(&sealed_event(100));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn non_matching_subscriber_survives_publish() {
        let bus = EventBus::default();
        let _rx = bus.subscribe(EventFilter {
            kinds: Some(vec![EventKind::LedgerFrozen]),
            ..Default::default()
        });

        bus.publish(&sealed_event(100));
        assert_eq!(bus.subscriber_count(), 1);
    }
}
