//! Metrics collection for the block miner subsystem

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for the block miner
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total build requests queued
    pub requests_queued: AtomicU64,

    /// Total blocks built and committed
    pub blocks_built: AtomicU64,

    /// Total requests that resolved with an error
    pub build_failures: AtomicU64,

    /// Total user extrinsics included (inherents excluded)
    pub transactions_included: AtomicU64,

    /// Total extrinsics reported as failing to apply
    pub apply_errors: AtomicU64,

    /// Total extrinsics put back into the pool after a build
    pub resubmitted: AtomicU64,

    /// Total time spent servicing requests (milliseconds)
    pub build_time_ms: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a queued request
    pub fn record_request(&self) {
        self.requests_queued.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a committed block
    pub fn record_block_built(&self, tx_count: usize, took: Duration) {
        self.blocks_built.fetch_add(1, Ordering::Relaxed);
        self.transactions_included
            .fetch_add(tx_count as u64, Ordering::Relaxed);
        self.build_time_ms
            .fetch_add(took.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed request
    pub fn record_build_failure(&self) {
        self.build_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an extrinsic that failed to apply
    pub fn record_apply_error(&self) {
        self.apply_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a resubmitted extrinsic
    pub fn record_resubmitted(&self) {
        self.resubmitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get blocks built
    pub fn get_blocks_built(&self) -> u64 {
        self.blocks_built.load(Ordering::Relaxed)
    }

    /// Get failed requests
    pub fn get_build_failures(&self) -> u64 {
        self.build_failures.load(Ordering::Relaxed)
    }

    /// Get queued requests
    pub fn get_requests_queued(&self) -> u64 {
        self.requests_queued.load(Ordering::Relaxed)
    }

    /// Get apply errors
    pub fn get_apply_errors(&self) -> u64 {
        self.apply_errors.load(Ordering::Relaxed)
    }

    /// Get resubmitted extrinsics
    pub fn get_resubmitted(&self) -> u64 {
        self.resubmitted.load(Ordering::Relaxed)
    }

    /// Get average transactions per block
    pub fn get_avg_transactions_per_block(&self) -> f64 {
        let blocks = self.blocks_built.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        let txs = self.transactions_included.load(Ordering::Relaxed);
        txs as f64 / blocks as f64
    }

    /// Get average build time (milliseconds)
    pub fn get_avg_build_time_ms(&self) -> f64 {
        let blocks = self.blocks_built.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        let time = self.build_time_ms.load(Ordering::Relaxed);
        time as f64 / blocks as f64
    }
}
