// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Operation context: identity, interruption and the checked-out session slot

use crate::router::TransactionRouter;
use crate::session::error::{SessionError, SessionResult};
use crate::session::handle::ScopedCheckedOutSession;
use crate::session::id::{LogicalSessionId, TxnNumber};
use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationId(u64);

impl OperationId {
    /// Allocate the next operation id
    pub fn next() -> Self {
        OperationId(NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn from_u64(id: u64) -> Self {
        OperationId(id)
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "op_{}", self.0)
    }
}

/// Why an operation was killed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptReason {
    /// Explicit kill from a client or administrator
    Killed,
    /// The node is shutting down
    Shutdown,
    /// The node is changing replication role
    StepDown,
}

impl std::fmt::Display for InterruptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            InterruptReason::Killed => "operation was killed",
            InterruptReason::Shutdown => "interrupted at shutdown",
            InterruptReason::StepDown => "interrupted due to replication state change",
        };
        write!(f, "{}", text)
    }
}

/// Per-operation context passed by reference through the call chain
///
/// Carries the logical session the operation runs under, its deadline and
/// kill state, the transaction router for the active multi-statement
/// transaction (if any), and the slot holding the session this operation has
/// checked out.
pub struct OperationContext {
    op_id: OperationId,
    lsid: Option<LogicalSessionId>,
    txn_number: Option<TxnNumber>,
    deadline: Option<Instant>,
    kill_reason: Mutex<Option<InterruptReason>>,
    transaction_router: Option<Arc<dyn TransactionRouter>>,
    /// Guards the checked-out session binding. Other threads may inspect the
    /// binding, so it is only read or replaced under this lock. Never acquire
    /// the catalog lock while holding it.
    checked_out_session: Mutex<Option<ScopedCheckedOutSession>>,
}

impl OperationContext {
    /// Create a context for an operation with no session
    pub fn new() -> Self {
        Self {
            op_id: OperationId::next(),
            lsid: None,
            txn_number: None,
            deadline: None,
            kill_reason: Mutex::new(None),
            transaction_router: None,
            checked_out_session: Mutex::new(None),
        }
    }

    /// Run this operation under a logical session
    pub fn with_session(mut self, lsid: LogicalSessionId) -> Self {
        self.lsid = Some(lsid);
        self
    }

    pub fn with_txn_number(mut self, txn_number: TxnNumber) -> Self {
        self.txn_number = Some(txn_number);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to now
    pub fn with_time_limit(self, limit: Duration) -> Self {
        self.with_deadline(Instant::now() + limit)
    }

    /// Attach the router of the multi-statement transaction this operation
    /// belongs to
    pub fn with_transaction_router(mut self, router: Arc<dyn TransactionRouter>) -> Self {
        self.transaction_router = Some(router);
        self
    }

    pub fn op_id(&self) -> OperationId {
        self.op_id
    }

    pub fn logical_session_id(&self) -> Option<&LogicalSessionId> {
        self.lsid.as_ref()
    }

    pub fn txn_number(&self) -> Option<TxnNumber> {
        self.txn_number
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn transaction_router(&self) -> Option<&Arc<dyn TransactionRouter>> {
        self.transaction_router.as_ref()
    }

    /// Kill this operation. The first reason wins; any blocking wait observes
    /// the kill within one interrupt check interval.
    pub fn kill(&self, reason: InterruptReason) {
        let mut kill_reason = self.kill_reason.lock();
        if kill_reason.is_none() {
            log::debug!("Killing operation {}: {}", self.op_id, reason);
            *kill_reason = Some(reason);
        }
    }

    pub fn is_killed(&self) -> bool {
        self.kill_reason.lock().is_some()
    }

    /// Fail if this operation has been killed or has run past its deadline
    pub fn check_for_interrupt(&self) -> SessionResult<()> {
        if let Some(reason) = *self.kill_reason.lock() {
            return Err(SessionError::Interrupted {
                op_id: self.op_id,
                reason,
            });
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(SessionError::ExceededTimeLimit { op_id: self.op_id });
            }
        }

        Ok(())
    }

    /// Block on `condvar` for at most `check_interval`, then report whether
    /// this operation was interrupted meanwhile.
    ///
    /// `Ok(())` does not mean the awaited condition holds; callers re-check
    /// their predicate in a loop.
    pub fn wait_for_condition_or_interrupt<T>(
        &self,
        condvar: &Condvar,
        guard: &mut MutexGuard<'_, T>,
        check_interval: Duration,
    ) -> SessionResult<()> {
        self.check_for_interrupt()?;

        let mut wake_at = Instant::now() + check_interval;
        if let Some(deadline) = self.deadline {
            wake_at = wake_at.min(deadline);
        }
        condvar.wait_until(guard, wake_at);

        self.check_for_interrupt()
    }

    pub(crate) fn session_binding(&self) -> &Mutex<Option<ScopedCheckedOutSession>> {
        &self.checked_out_session
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationContext")
            .field("op_id", &self.op_id)
            .field("lsid", &self.lsid)
            .field("txn_number", &self.txn_number)
            .field("deadline", &self.deadline)
            .field("killed", &self.is_killed())
            .field("in_transaction", &self.transaction_router.is_some())
            .finish()
    }
}
