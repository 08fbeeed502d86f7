//! # Bus Choreography
//!
//! The miner reacts to pool notifications it reads from the shared bus,
//! whoever published them. These tests publish events directly.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{sleep, Instant};

    use fl_01_txpool::TxPoolApi;
    use fl_02_block_miner::test_utils::{settle, TestNode};
    use fl_02_block_miner::{BlockMinerApi, MinerConfig, MinerMode};
    use shared_bus::{ChainEvent, EventPublisher};
    use shared_types::entities::{HexBytes, H256};

    fn xt(bytes: &[u8]) -> HexBytes {
        HexBytes::new(bytes.to_vec())
    }

    fn downward_notice() -> ChainEvent {
        ChainEvent::DownwardMessagesSubmitted {
            messages: Vec::new(),
        }
    }

    /// Node in `mode` with one extrinsic already pooled and no build pending.
    async fn node_with_pooled_extrinsic(mode: MinerMode) -> TestNode {
        let node = TestNode::start(MinerConfig::new(MinerMode::Manual));
        node.txpool.submit_extrinsic(xt(&[1, 0])).await.unwrap();
        settle().await;
        node.miner.set_config(MinerConfig::new(mode));
        node
    }

    #[tokio::test(start_paused = true)]
    async fn test_published_notification_triggers_instant_build() {
        let node = node_with_pooled_extrinsic(MinerMode::Instant).await;
        assert!(node.chain.commits().is_empty());

        node.bus.publish(downward_notice()).await;
        settle().await;

        assert_eq!(node.chain.commits().len(), 1);
        assert_eq!(node.builder.calls()[0].extrinsics, vec![xt(&[1, 0])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_miner_events_do_not_trigger_builds() {
        let node = node_with_pooled_extrinsic(MinerMode::Instant).await;

        node.bus
            .publish(ChainEvent::BlockBuilt {
                number: 7,
                hash: H256::zero(),
                extrinsic_count: 0,
            })
            .await;
        settle().await;

        assert!(node.chain.commits().is_empty());
        assert_eq!(node.txpool.status().extrinsics, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_published_notifications_extend_batch_window() {
        let node = node_with_pooled_extrinsic(MinerMode::Batch).await;
        let t0 = Instant::now();

        node.bus.publish(downward_notice()).await;
        sleep(Duration::from_millis(80)).await;
        node.bus.publish(downward_notice()).await;
        sleep(Duration::from_millis(90)).await;
        settle().await;
        assert!(node.chain.commits().is_empty());

        sleep(Duration::from_millis(20)).await;
        settle().await;
        assert_eq!(node.chain.commit_times(), vec![t0 + Duration::from_millis(180)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_with_empty_pool_builds_nothing() {
        let node = TestNode::start(MinerConfig::new(MinerMode::Instant));

        node.bus.publish(downward_notice()).await;
        settle().await;

        assert!(node.chain.commits().is_empty());
        assert_eq!(node.miner.metrics().get_requests_queued(), 0);
    }
}
