// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session-scoped transaction state
//!
//! The catalog treats this record as opaque: it only invalidates it and tells
//! it which operation currently owns the session. Transaction lifecycle
//! transitions belong to the participant layer built on top of it.

use crate::operation::OperationId;
use crate::session::id::TxnNumber;

/// Transaction state owned by one catalog entry
///
/// Mutated only by the operation that has the session checked out, except for
/// [`invalidate`](Self::invalidate), which the catalog applies under its own
/// lock.
#[derive(Debug, Clone, Default)]
pub struct SessionTransactionState {
    /// Highest transaction number seen on this session
    active_txn_number: Option<TxnNumber>,

    /// Whether the in-memory state still reflects the persisted record
    valid: bool,

    /// Number of times this state has been invalidated
    invalidation_count: u64,

    /// Operation that currently has the session checked out
    current_operation: Option<OperationId>,
}

impl SessionTransactionState {
    pub fn new() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// Mark the state stale; the owner must reload before trusting it again
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.active_txn_number = None;
        self.invalidation_count += 1;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalidation_count(&self) -> u64 {
        self.invalidation_count
    }

    /// Mark the state reloaded from the persisted record
    pub fn refresh(&mut self, persisted_txn_number: Option<TxnNumber>) {
        self.active_txn_number = persisted_txn_number;
        self.valid = true;
    }

    pub fn active_txn_number(&self) -> Option<TxnNumber> {
        self.active_txn_number
    }

    /// Advance to `txn_number`. Returns false if it is older than the active
    /// transaction number, which leaves the state unchanged.
    pub fn begin_or_continue(&mut self, txn_number: TxnNumber) -> bool {
        match self.active_txn_number {
            Some(active) if txn_number < active => false,
            _ => {
                self.active_txn_number = Some(txn_number);
                true
            }
        }
    }

    pub fn set_current_operation(&mut self, op_id: OperationId) {
        if let Some(existing) = self.current_operation {
            crate::session::error::protocol_violation(&format!(
                "session already bound to operation {} while binding {}",
                existing, op_id
            ));
        }
        self.current_operation = Some(op_id);
    }

    pub fn clear_current_operation(&mut self) {
        self.current_operation = None;
    }

    pub fn current_operation(&self) -> Option<OperationId> {
        self.current_operation
    }
}
