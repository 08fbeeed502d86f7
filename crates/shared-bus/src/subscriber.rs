//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{ChainEvent, EventFilter};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// A subscription handle for receiving events.
///
/// Dropping it releases the underlying receiver.
pub struct Subscription {
    receiver: broadcast::Receiver<ChainEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<ChainEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next event that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next matching event
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<ChainEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Try to receive the next event without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was available and matched
    /// - `Ok(None)` - No event available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<ChainEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Drain every matching event that is already buffered.
    pub fn drain(&mut self) -> Vec<ChainEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
/// Lagged gaps are skipped silently.
pub struct EventStream {
    inner: BroadcastStream<ChainEvent>,
    filter: EventFilter,
}

impl EventStream {
    /// Create a new event stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let Subscription { receiver, filter } = subscription;
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
        }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = ChainEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(event)) if self.filter.matches(&event) => return Poll::Ready(Some(event)),
                Some(Ok(_)) => continue,
                Some(Err(BroadcastStreamRecvError::Lagged(count))) => {
                    debug!(lagged = count, "Event stream lagged, some events dropped");
                    continue;
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use crate::publisher::InMemoryEventBus;
    use crate::EventPublisher;
    use shared_types::entities::{HexBytes, H256};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    fn submitted(byte: u8) -> ChainEvent {
        ChainEvent::TransactionSubmitted {
            extrinsic: HexBytes::new(vec![byte]),
            signer: "bob".into(),
        }
    }

    fn built(number: u64) -> ChainEvent {
        ChainEvent::BlockBuilt {
            number,
            hash: H256::zero(),
            extrinsic_count: 0,
        }
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        bus.publish(submitted(1)).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");

        assert_eq!(received, submitted(1));
    }

    #[tokio::test]
    async fn test_subscription_filter() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::BlockMiner]));

        // Filtered out
        bus.publish(submitted(1)).await;
        bus.publish(built(4)).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");

        assert_eq!(received, built(4));
    }

    #[tokio::test]
    async fn test_subscription_drop_cleanup() {
        let bus = InMemoryEventBus::new();

        {
            let _sub1 = bus.subscribe(EventFilter::all());
            let _sub2 = bus.subscribe(EventFilter::all());
            assert_eq!(bus.subscriber_count(), 2);
        }

        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        assert!(matches!(sub.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_drain_preserves_order() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::TxPool]));

        for byte in 0..3 {
            bus.publish(submitted(byte)).await;
        }
        bus.publish(built(1)).await;

        assert_eq!(sub.drain(), vec![submitted(0), submitted(1), submitted(2)]);
        assert!(sub.drain().is_empty());
    }

    #[tokio::test]
    async fn test_event_stream_yields_matching_events() {
        let bus = InMemoryEventBus::new();
        let filter = EventFilter::topics(vec![EventTopic::BlockMiner]);
        let mut stream = bus.event_stream(filter);
        assert_eq!(EventStream::filter(&stream).topics, vec![EventTopic::BlockMiner]);

        bus.publish(submitted(1)).await;
        bus.publish(built(2)).await;

        let next = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout");
        assert_eq!(next, Some(built(2)));
    }

    #[tokio::test]
    async fn test_event_stream_ends_when_bus_dropped() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::all());
        drop(bus);

        assert_eq!(stream.next().await, None);
    }
}
