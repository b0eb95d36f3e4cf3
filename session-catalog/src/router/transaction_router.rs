// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction routers track which shards take part in a transaction

use crate::router::participant::{ShardParticipant, TransactionParticipant};
use crate::router::shard::ShardId;
use crate::sender::Document;
use crate::session::id::TxnNumber;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Router of the multi-statement transaction an operation runs in
///
/// Attached to an [`OperationContext`](crate::operation::OperationContext)
/// for the duration of the transaction.
pub trait TransactionRouter: Send + Sync {
    /// The participant for `shard_id`, created on first use
    fn get_or_create_participant(&self, shard_id: &ShardId) -> Arc<dyn TransactionParticipant>;
}

#[derive(Debug, Default)]
struct RouterState {
    participants: BTreeMap<ShardId, Arc<ShardParticipant>>,
    coordinator: Option<ShardId>,
}

/// In-process router; the first shard contacted coordinates the transaction
#[derive(Debug)]
pub struct ShardTransactionRouter {
    txn_number: TxnNumber,
    read_concern: Option<Document>,
    state: Mutex<RouterState>,
}

impl ShardTransactionRouter {
    pub fn new(txn_number: TxnNumber) -> Self {
        Self {
            txn_number,
            read_concern: None,
            state: Mutex::new(RouterState::default()),
        }
    }

    /// Read concern level sent with each participant's first command
    pub fn with_read_concern(mut self, level: &str) -> Self {
        let mut read_concern = Document::new();
        read_concern.insert("level".to_string(), Value::String(level.to_string()));
        self.read_concern = Some(read_concern);
        self
    }

    pub fn txn_number(&self) -> TxnNumber {
        self.txn_number
    }

    pub fn coordinator_id(&self) -> Option<ShardId> {
        self.state.lock().coordinator.clone()
    }

    pub fn participant(&self, shard_id: &ShardId) -> Option<Arc<ShardParticipant>> {
        self.state.lock().participants.get(shard_id).cloned()
    }

    pub fn participant_count(&self) -> usize {
        self.state.lock().participants.len()
    }
}

impl TransactionRouter for ShardTransactionRouter {
    fn get_or_create_participant(&self, shard_id: &ShardId) -> Arc<dyn TransactionParticipant> {
        let mut state = self.state.lock();
        if let Some(existing) = state.participants.get(shard_id) {
            return Arc::clone(existing) as Arc<dyn TransactionParticipant>;
        }

        let is_coordinator = state.coordinator.is_none();
        if is_coordinator {
            log::debug!(
                "Shard {} coordinates transaction {}",
                shard_id,
                self.txn_number
            );
            state.coordinator = Some(shard_id.clone());
        }

        let participant = Arc::new(ShardParticipant::new(
            shard_id.clone(),
            is_coordinator,
            self.txn_number,
            self.read_concern.clone(),
        ));
        state
            .participants
            .insert(shard_id.clone(), Arc::clone(&participant));
        participant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_participant_coordinates() {
        let router = ShardTransactionRouter::new(5);
        let first = ShardId::new("shard-a");
        let second = ShardId::new("shard-b");

        router.get_or_create_participant(&first);
        router.get_or_create_participant(&second);

        assert_eq!(router.coordinator_id(), Some(first.clone()));
        assert!(router.participant(&first).unwrap().is_coordinator());
        assert!(!router.participant(&second).unwrap().is_coordinator());
    }

    #[test]
    fn test_participants_are_reused() {
        let router = ShardTransactionRouter::new(1);
        let shard = ShardId::new("shard-a");

        router.get_or_create_participant(&shard).mark_as_command_sent();
        let again = router.get_or_create_participant(&shard);

        assert_eq!(router.participant_count(), 1);
        assert_eq!(again.shard_id(), &shard);
        assert!(!router.participant(&shard).unwrap().must_start_transaction());
    }
}
