//! # ForkLab Test Suite
//!
//! Cross-crate tests for the pool and the block miner.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Pool snapshot throughput
//! └── src/integration/  # Pool → bus → miner → chain flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fl-tests
//! cargo test -p fl-tests integration::
//! cargo bench -p fl-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
