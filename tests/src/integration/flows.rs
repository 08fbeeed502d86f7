//! # Integration Test Flows
//!
//! Submissions entering fl-01-txpool and leaving as committed blocks built
//! by fl-02-block-miner, for each miner mode.
//!
//! ## Flows Tested
//!
//! 1. **Batch**: transactions and cross-chain messages coalesce into one block
//! 2. **Resubmission**: a failed extrinsic returns to the pool and lands later
//! 3. **Configuration**: RPC-shaped JSON and CLI-style args drive the timer
//! 4. **Concurrency**: concurrent submitters, every transaction committed once

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::{sleep, timeout};
    use tokio_stream::StreamExt;

    use fl_01_txpool::{BuildOverrides, TxPoolApi};
    use fl_02_block_miner::test_utils::{settle, ScriptedBlockBuilder, TestNode};
    use fl_02_block_miner::{BlockMinerApi, MinerConfig, MinerMode};
    use shared_bus::{ChainEvent, EventFilter, EventTopic};
    use shared_types::entities::{DownwardMessage, Extrinsic, HexBytes, HorizontalMessage};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn xt(bytes: &[u8]) -> Extrinsic {
        HexBytes::new(bytes.to_vec())
    }

    fn start(config: MinerConfig) -> TestNode {
        forklab_telemetry::try_init_for_tests();
        TestNode::start(config)
    }

    /// Committed user extrinsics, inherents stripped.
    fn committed(node: &TestNode) -> Vec<Extrinsic> {
        node.chain
            .commits()
            .into_iter()
            .flat_map(|block| block.extrinsics)
            .filter(|e| !e.as_bytes().starts_with(b"inherent:"))
            .collect()
    }

    // =============================================================================
    // BATCH MODE
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_batch_flow_carries_transactions_and_messages() {
        let node = start(MinerConfig::default());
        let mut miner_events = node
            .bus
            .event_stream(EventFilter::topics(vec![EventTopic::BlockMiner]));

        node.txpool.submit_extrinsic(xt(&[0xaa, 1])).await.unwrap();
        node.txpool.submit_upward_messages(1000, vec![xt(&[1])]).await;
        node.txpool
            .submit_downward_messages(vec![DownwardMessage {
                sent_at: 1,
                msg: xt(&[2]),
            }])
            .await;
        node.txpool
            .submit_horizontal_messages(
                2000,
                vec![HorizontalMessage {
                    sent_at: 1,
                    data: xt(&[3]),
                }],
            )
            .await;

        let event = miner_events.next().await.unwrap();
        assert!(matches!(
            event,
            ChainEvent::BlockBuilt {
                number: 1,
                extrinsic_count: 2,
                ..
            }
        ));

        // one block for the whole burst
        let calls = node.builder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].extrinsics, vec![xt(&[0xaa, 1])]);
        assert_eq!(calls[0].upward_messages[&1000], vec![xt(&[1])]);

        // messages the builder does not take reach the inherent provider
        let (parent, params) = &node.inherents.calls()[0];
        assert_eq!(*parent, 0);
        assert_eq!(params.downward_messages.len(), 1);
        assert_eq!(params.horizontal_messages[&2000].len(), 1);

        assert!(node.txpool.status().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_make_separate_blocks() {
        let node = start(MinerConfig::default());

        node.txpool.submit_extrinsic(xt(&[1, 0])).await.unwrap();
        sleep(Duration::from_millis(300)).await;
        settle().await;
        node.txpool.submit_extrinsic(xt(&[2, 0])).await.unwrap();
        sleep(Duration::from_millis(300)).await;
        settle().await;

        let blocks = node.chain.commits();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].extrinsics.last(), Some(&xt(&[1, 0])));
        assert_eq!(blocks[1].extrinsics.last(), Some(&xt(&[2, 0])));
    }

    // =============================================================================
    // RESUBMISSION
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_failed_extrinsic_lands_in_next_period_block() {
        let node = start(MinerConfig::new(MinerMode::Manual));
        let mut errors = node
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::BlockMiner]));
        node.builder.fail_times(xt(&[2, 0]), "future nonce", 1);

        node.txpool.submit_extrinsic(xt(&[1, 0])).await.unwrap();
        node.txpool.submit_extrinsic(xt(&[2, 0])).await.unwrap();
        node.miner.build_block(BuildOverrides::none()).await.unwrap();

        assert_eq!(node.txpool.pending_extrinsics_by("0x02"), vec![xt(&[2, 0])]);

        node.miner.set_config(MinerConfig::period(2));
        sleep(Duration::from_millis(2_500)).await;
        settle().await;

        assert_eq!(committed(&node), vec![xt(&[1, 0]), xt(&[2, 0])]);
        let apply_errors = errors
            .drain()
            .into_iter()
            .filter(|e| matches!(e, ChainEvent::ApplyExtrinsicError { .. }))
            .count();
        assert_eq!(apply_errors, 1);
    }

    // =============================================================================
    // CONFIGURATION
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_rpc_and_cli_configs_drive_timer() {
        let node = start(MinerConfig::new(MinerMode::Manual));

        let rpc: MinerConfig =
            serde_json::from_value(json!({ "mode": 3, "args": { "interval": "2" } })).unwrap();
        node.miner.set_config(rpc);
        assert_eq!(node.miner.timer_interval(), Some(Duration::from_secs(2)));

        sleep(Duration::from_millis(6_500)).await;
        settle().await;
        // Period ticks build even when the pool is empty
        assert_eq!(node.chain.commits().len(), 3);

        let cli = MinerConfig::from_args(vec![("miner-mode", json!("2")), ("port", json!(9944))], true)
            .unwrap();
        node.miner.set_config(cli);
        sleep(Duration::from_secs(10)).await;
        settle().await;

        assert_eq!(node.chain.commits().len(), 3);
        assert_eq!(node.miner.config().mode, MinerMode::Manual);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_interval_uses_default_period() {
        let node = start(MinerConfig::period(-3));

        sleep(Duration::from_millis(11_900)).await;
        settle().await;
        assert!(node.chain.commits().is_empty());

        sleep(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(node.chain.commits().len(), 1);
    }

    // =============================================================================
    // BACKLOG AND CONCURRENCY
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_manual_backlog_drains_back_to_back() {
        let (builder, gate) = ScriptedBlockBuilder::gated();
        let node = TestNode::start_with_builder(MinerConfig::new(MinerMode::Manual), builder);

        for _ in 0..3 {
            node.miner.request_build(BuildOverrides::none());
        }
        gate.add_permits(3);

        assert_eq!(node.miner.upcoming_blocks().await, 3);
        assert_eq!(node.chain.head_number(), 3);
        assert_eq!(node.miner.upcoming_blocks().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submitters_each_transaction_committed_once() {
        let node = Arc::new(start(MinerConfig::new(MinerMode::Instant)));

        let mut handles = Vec::new();
        for task in 0..8u8 {
            let node = node.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25u8 {
                    node.txpool.submit_extrinsic(xt(&[task, i])).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        timeout(Duration::from_secs(10), async {
            while committed(&node).len() < 200 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("all transactions committed");

        let all = committed(&node);
        let unique: HashSet<_> = all.iter().cloned().collect();
        assert_eq!(all.len(), 200);
        assert_eq!(unique.len(), 200);
        assert_eq!(node.builder.max_in_flight(), 1);
        assert!(node.txpool.status().is_empty());
    }
}
