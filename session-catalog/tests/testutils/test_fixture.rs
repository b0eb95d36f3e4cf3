//! Catalog fixture for concurrency tests

use session_catalog::{LogicalSessionId, OperationContext, SessionCatalog, SessionCatalogConfig};
use std::time::{Duration, Instant};

/// How long helpers wait for another thread to reach a state
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog with a short interrupt check interval
pub struct CatalogFixture {
    pub catalog: SessionCatalog,
}

impl CatalogFixture {
    pub fn new() -> Self {
        super::init_logging();
        let config = SessionCatalogConfig {
            interrupt_check_interval_ms: 5,
            ..SessionCatalogConfig::default()
        };
        Self {
            catalog: SessionCatalog::new(config),
        }
    }

    /// Context for an operation running under `lsid`
    pub fn op_for(&self, lsid: LogicalSessionId) -> OperationContext {
        OperationContext::new().with_session(lsid)
    }

    /// Spin until `lsid` has `count` queued checkouts
    pub fn wait_for_waiters(&self, lsid: &LogicalSessionId, count: usize) {
        wait_until(|| self.catalog.waiter_count(lsid) >= count);
    }
}

/// Poll `condition` until it holds, failing the test after [`SETTLE_TIMEOUT`]
pub fn wait_until<F: FnMut() -> bool>(mut condition: F) {
    let started = Instant::now();
    while !condition() {
        assert!(
            started.elapsed() < SETTLE_TIMEOUT,
            "Condition not reached within {:?}",
            SETTLE_TIMEOUT
        );
        std::thread::sleep(Duration::from_millis(1));
    }
}
