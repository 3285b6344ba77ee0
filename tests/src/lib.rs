//! # E4 C2 Test Suite
//!
//! Cross-crate tests that drive the C2 backend the way an operator and a fleet
//! of devices would.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/            # criterion benchmarks (codec, protection, service)
//! └── src/integration/
//!     ├── device.rs       # simulated device firmware
//!     ├── symmetric.rs    # end-to-end flows, Symmetric mode
//!     ├── pubkey.rs       # end-to-end flows, Public-Key mode
//!     └── restart.rs      # persistence across runtime restarts
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p c2-tests
//!
//! # Against RocksDB
//! cargo test -p c2-tests --features rocksdb
//!
//! # Benchmarks
//! cargo bench -p c2-tests
//! ```

pub mod integration;
