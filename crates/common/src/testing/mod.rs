//! Test doubles for the storage and time seams.
//!
//! Available under the `test-utils` feature so dependent crates can drive
//! token stores and handshakes deterministically.

pub mod mocks;
pub mod time;

pub use mocks::FailingStore;
pub use time::MockClock;
