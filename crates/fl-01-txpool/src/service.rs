//! # TxPool Service
//!
//! Wires the pool buffers to the signer resolver and the shared bus.

use crate::domain::{BuildOverrides, PoolBuffers, PoolEntry, PoolStatus, TxPoolError};
use crate::ports::{SignerResolver, TxPoolApi};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{ChainEvent, EventPublisher};
use shared_types::entities::{
    BuildBlockParams, DownwardMessage, Extrinsic, HexBytes, HorizontalMessage,
    HorizontalMessages, ParaId, UpwardMessages,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// The pending work pool.
///
/// Buffers sit behind a single lock that is never held across an await, so
/// a snapshot can never interleave with an append.
pub struct TxPool {
    resolver: Arc<dyn SignerResolver>,
    publisher: Arc<dyn EventPublisher>,
    buffers: Mutex<PoolBuffers>,
}

impl TxPool {
    /// Creates an empty pool.
    pub fn new(resolver: Arc<dyn SignerResolver>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            resolver,
            publisher,
            buffers: Mutex::new(PoolBuffers::new()),
        }
    }
}

#[async_trait]
impl TxPoolApi for TxPool {
    async fn submit_extrinsic(&self, extrinsic: Extrinsic) -> Result<String, TxPoolError> {
        let signer = match self.resolver.resolve_signer(&extrinsic).await {
            Ok(signer) => signer,
            Err(e) => {
                warn!("[fl-01] Rejected extrinsic {:?}: {}", extrinsic, e);
                return Err(e);
            }
        };

        self.buffers
            .lock()
            .push_extrinsic(extrinsic.clone(), signer.clone());
        debug!(signer = %signer, "[fl-01] Extrinsic accepted {:?}", extrinsic);

        self.publisher
            .publish(ChainEvent::TransactionSubmitted {
                extrinsic,
                signer: signer.clone(),
            })
            .await;
        Ok(signer)
    }

    async fn submit_upward_messages(&self, para_id: ParaId, messages: Vec<HexBytes>) {
        self.buffers.lock().push_upward(para_id, messages.clone());
        debug!(para_id, count = messages.len(), "[fl-01] Upward messages queued");
        self.publisher
            .publish(ChainEvent::UpwardMessagesSubmitted { para_id, messages })
            .await;
    }

    async fn submit_downward_messages(&self, messages: Vec<DownwardMessage>) {
        self.buffers.lock().push_downward(messages.clone());
        debug!(count = messages.len(), "[fl-01] Downward messages queued");
        self.publisher
            .publish(ChainEvent::DownwardMessagesSubmitted { messages })
            .await;
    }

    async fn submit_horizontal_messages(&self, para_id: ParaId, messages: Vec<HorizontalMessage>) {
        self.buffers.lock().push_horizontal(para_id, messages.clone());
        debug!(para_id, count = messages.len(), "[fl-01] Horizontal messages queued");
        self.publisher
            .publish(ChainEvent::HorizontalMessagesSubmitted { para_id, messages })
            .await;
    }

    fn create_new_block(&self, overrides: BuildOverrides) -> BuildBlockParams {
        let params = self.buffers.lock().take_for_build(overrides);
        debug!(
            transactions = params.transactions.len(),
            messages = params.message_count(),
            "[fl-01] Snapshot taken"
        );
        params
    }

    fn clear(&self) {
        self.buffers.lock().clear();
        debug!("[fl-01] Pool cleared");
    }

    fn pending_extrinsics(&self) -> Vec<PoolEntry> {
        self.buffers.lock().entries().to_vec()
    }

    fn pending_extrinsics_by(&self, signer: &str) -> Vec<Extrinsic> {
        self.buffers
            .lock()
            .entries_by(signer)
            .map(|entry| entry.extrinsic.clone())
            .collect()
    }

    fn ump(&self) -> UpwardMessages {
        self.buffers.lock().ump().clone()
    }

    fn dmp(&self) -> Vec<DownwardMessage> {
        self.buffers.lock().dmp().to_vec()
    }

    fn hrmp(&self) -> HorizontalMessages {
        self.buffers.lock().hrmp().clone()
    }

    fn status(&self) -> PoolStatus {
        self.buffers.lock().status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PrefixSignerResolver;
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};

    fn xt(bytes: &[u8]) -> Extrinsic {
        HexBytes::new(bytes.to_vec())
    }

    fn create_pool() -> (TxPool, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let pool = TxPool::new(Arc::new(PrefixSignerResolver::new()), bus.clone());
        (pool, bus)
    }

    #[tokio::test]
    async fn test_submit_resolves_signer_and_publishes() {
        let (pool, bus) = create_pool();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::TxPool]));

        let signer = pool.submit_extrinsic(xt(&[0xaa, 1])).await.unwrap();

        assert_eq!(signer, "0xaa");
        assert_eq!(
            pool.pending_extrinsics(),
            vec![PoolEntry {
                extrinsic: xt(&[0xaa, 1]),
                signer: "0xaa".into()
            }]
        );
        assert_eq!(
            sub.try_recv().unwrap(),
            Some(ChainEvent::TransactionSubmitted {
                extrinsic: xt(&[0xaa, 1]),
                signer: "0xaa".into()
            })
        );
    }

    #[tokio::test]
    async fn test_undecodable_extrinsic_is_rejected() {
        let (pool, bus) = create_pool();
        let mut sub = bus.subscribe(EventFilter::all());

        let err = pool.submit_extrinsic(xt(&[])).await.unwrap_err();

        assert!(matches!(err, TxPoolError::Decode(_)));
        assert!(pool.status().is_empty());
        assert_eq!(sub.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn test_snapshot_preserves_submission_order() {
        let (pool, _bus) = create_pool();
        for byte in 1..=3u8 {
            pool.submit_extrinsic(xt(&[byte, 0])).await.unwrap();
        }

        let params = pool.create_new_block(BuildOverrides::none());

        assert_eq!(
            params.transactions,
            vec![xt(&[1, 0]), xt(&[2, 0]), xt(&[3, 0])]
        );
        assert!(pool.pending_extrinsics().is_empty());
    }

    #[tokio::test]
    async fn test_submission_after_snapshot_waits_for_next_one() {
        let (pool, _bus) = create_pool();
        pool.submit_extrinsic(xt(&[1, 0])).await.unwrap();

        let first = pool.create_new_block(BuildOverrides::none());
        pool.submit_extrinsic(xt(&[2, 0])).await.unwrap();

        assert_eq!(first.transactions, vec![xt(&[1, 0])]);
        assert_eq!(pool.pending_extrinsics().len(), 1);

        let second = pool.create_new_block(BuildOverrides::none());
        assert_eq!(second.transactions, vec![xt(&[2, 0])]);
    }

    #[tokio::test]
    async fn test_message_submissions_publish_and_queue() {
        let (pool, bus) = create_pool();
        let mut sub = bus.subscribe(EventFilter::all());

        pool.submit_upward_messages(1000, vec![xt(&[1])]).await;
        pool.submit_downward_messages(vec![DownwardMessage {
            sent_at: 1,
            msg: xt(&[2]),
        }])
        .await;
        pool.submit_horizontal_messages(
            2000,
            vec![HorizontalMessage {
                sent_at: 1,
                data: xt(&[3]),
            }],
        )
        .await;

        let events = sub.drain();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(ChainEvent::is_submission));

        assert_eq!(pool.ump()[&1000], vec![xt(&[1])]);
        assert_eq!(pool.dmp().len(), 1);
        assert_eq!(pool.hrmp()[&2000].len(), 1);

        let status = pool.status();
        assert_eq!(status.upward_messages, 1);
        assert_eq!(status.downward_messages, 1);
        assert_eq!(status.horizontal_messages, 1);
    }

    #[tokio::test]
    async fn test_pending_by_signer_and_clear() {
        let (pool, _bus) = create_pool();
        pool.submit_extrinsic(xt(&[0xaa, 1])).await.unwrap();
        pool.submit_extrinsic(xt(&[0xbb, 1])).await.unwrap();
        pool.submit_extrinsic(xt(&[0xaa, 2])).await.unwrap();

        assert_eq!(
            pool.pending_extrinsics_by("0xaa"),
            vec![xt(&[0xaa, 1]), xt(&[0xaa, 2])]
        );

        pool.clear();
        assert!(pool.status().is_empty());
        assert!(pool.pending_extrinsics_by("0xaa").is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_never_lost_or_duplicated() {
        let (pool, _bus) = create_pool();
        let pool = Arc::new(pool);

        let mut handles = Vec::new();
        for i in 0..50u8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                pool.submit_extrinsic(xt(&[i, 0])).await.unwrap();
            }));
        }

        let mut taken = Vec::new();
        for handle in handles {
            handle.await.unwrap();
            taken.extend(pool.create_new_block(BuildOverrides::none()).transactions);
        }
        taken.extend(pool.create_new_block(BuildOverrides::none()).transactions);

        taken.sort();
        let expected: Vec<_> = (0..50u8).map(|i| xt(&[i, 0])).collect();
        assert_eq!(taken, expected);
    }
}
