//! Test utilities for session catalog integration tests
//!
//! - CatalogFixture: a catalog plus helpers for driving concurrent checkouts
//! - ScriptedSender: an in-memory requests sender recording what it was given

#![allow(dead_code)]

pub mod mock_sender;
pub mod test_fixture;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
