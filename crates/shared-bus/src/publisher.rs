//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{ChainEvent, EventFilter};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event.
    async fn publish(&self, event: ChainEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// Callback run on the publishing task, before `publish` returns.
pub type EventHandler = Arc<dyn Fn(&ChainEvent) + Send + Sync>;

/// Handle for removing a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Registration {
    id: HandlerId,
    filter: EventFilter,
    handler: EventHandler,
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Suitable for a single node; the pool and the miner share one instance.
///
/// Besides queued subscriptions, the bus runs synchronous handlers registered
/// with [`InMemoryEventBus::on`]. A handler sees each matching event before
/// the publisher's next statement runs.
pub struct InMemoryEventBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<ChainEvent>,

    /// Synchronous handlers, in registration order.
    handlers: RwLock<Vec<Registration>>,

    /// Next handler id.
    next_handler: AtomicU64,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            handlers: RwLock::new(Vec::new()),
            next_handler: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Only events published after this call are delivered.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(receiver, filter)
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Register a handler that runs inline for every matching event.
    ///
    /// The handler runs with no bus lock held, so it may publish or register.
    pub fn on<F>(&self, filter: EventFilter, handler: F) -> HandlerId
    where
        F: Fn(&ChainEvent) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_handler.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push(Registration {
            id,
            filter,
            handler: Arc::new(handler),
        });
        debug!(handler = id.0, "Event handler registered");
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn off(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|r| r.id != id);
        before != handlers.len()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Publish without awaiting.
    ///
    /// Broadcasting never blocks, so synchronous callbacks (such as the
    /// builder's apply-error hook) can publish through this directly.
    ///
    /// Returns the number of subscribers and handlers that received the event.
    pub fn emit(&self, event: ChainEvent) -> usize {
        let topic = event.topic();
        let source = event.source_subsystem();

        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .iter()
            .filter(|r| r.filter.matches(&event))
            .map(|r| r.handler.clone())
            .collect();

        let receivers = self.sender.send(event.clone()).unwrap_or(0);

        for handler in &handlers {
            handler(&event);
        }

        let delivered = receivers + handlers.len();
        if delivered == 0 {
            trace!(topic = ?topic, source = source, "Event dropped (no receivers)");
        } else {
            debug!(
                topic = ?topic,
                source = source,
                receivers,
                handlers = handlers.len(),
                "Event published"
            );
        }
        delivered
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: ChainEvent) -> usize {
        self.emit(event)
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use shared_types::entities::HexBytes;

    fn apply_error() -> ChainEvent {
        ChainEvent::ApplyExtrinsicError {
            extrinsic: HexBytes::new(vec![9]),
            error: "bad nonce".into(),
        }
    }

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let bus = InMemoryEventBus::new();

        let receivers = bus.publish(apply_error()).await;
        assert_eq!(receivers, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn test_publish_with_subscriber() {
        let bus = InMemoryEventBus::new();

        // Create subscriber BEFORE publishing
        let _sub = bus.subscribe(EventFilter::all());

        let receivers = bus.publish(apply_error()).await;

        assert_eq!(receivers, 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = InMemoryEventBus::new();

        let _sub1 = bus.subscribe(EventFilter::all());
        let _sub2 = bus.subscribe(EventFilter::all());
        let _sub3 = bus.subscribe(EventFilter::topics(vec![EventTopic::TxPool]));

        // Filtering happens on the receiving side, so every receiver counts.
        let receivers = bus.publish(apply_error()).await;

        assert_eq!(receivers, 3);
        assert_eq!(bus.subscriber_count(), 3);
    }

    #[test]
    fn test_emit_outside_runtime() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        assert_eq!(bus.emit(apply_error()), 1);
        assert!(matches!(
            sub.try_recv(),
            Ok(Some(ChainEvent::ApplyExtrinsicError { .. }))
        ));
    }

    #[tokio::test]
    async fn test_handler_runs_before_publish_returns() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.on(EventFilter::topics(vec![EventTopic::BlockMiner]), move |event| {
            sink.lock().push(event.clone());
        });

        assert_eq!(bus.publish(apply_error()).await, 1);
        assert_eq!(*seen.lock(), vec![apply_error()]);
    }

    #[test]
    fn test_handler_respects_filter_and_removal() {
        let bus = InMemoryEventBus::new();
        let calls = Arc::new(AtomicU64::new(0));

        let counter = calls.clone();
        let id = bus.on(EventFilter::topics(vec![EventTopic::TxPool]), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bus.handler_count(), 1);

        // not a pool topic
        assert_eq!(bus.emit(apply_error()), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(bus.off(id));
        assert!(!bus.off(id));
        assert_eq!(bus.handler_count(), 0);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::DeadLetterQueue]));

        let inner = Arc::downgrade(&bus);
        bus.on(EventFilter::topics(vec![EventTopic::BlockMiner]), move |_| {
            if let Some(bus) = inner.upgrade() {
                bus.emit(ChainEvent::CriticalError {
                    subsystem_id: 2,
                    error: "relayed".into(),
                });
            }
        });

        bus.emit(apply_error());
        assert!(matches!(
            sub.try_recv(),
            Ok(Some(ChainEvent::CriticalError { .. }))
        ));
    }

    #[tokio::test]
    async fn test_custom_capacity() {
        let bus = InMemoryEventBus::with_capacity(100);
        assert_eq!(bus.capacity(), 100);
    }

    #[test]
    fn test_default_bus() {
        let bus = InMemoryEventBus::default();
        assert_eq!(bus.capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.events_published(), 0);
    }
}
