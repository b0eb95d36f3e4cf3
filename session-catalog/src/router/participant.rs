// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-shard transaction participants
//!
//! A participant records one shard's involvement in a multi-statement
//! transaction. Its only job here is to stamp outgoing commands with the
//! transaction fields the shard needs: every command carries the
//! transaction number, and the first command additionally starts the
//! transaction on that shard.

use crate::router::shard::ShardId;
use crate::sender::Document;
use crate::session::id::TxnNumber;
use parking_lot::Mutex;
use serde_json::Value;

/// One shard's view of the active transaction
pub trait TransactionParticipant: Send + Sync {
    fn shard_id(&self) -> &ShardId;

    /// Return `cmd` with the transaction fields this participant requires
    fn attach_txn_fields_if_needed(&self, cmd: &Document) -> Document;

    /// Record that a command reached the shard. Idempotent.
    fn mark_as_command_sent(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParticipantState {
    MustStartTransaction,
    CommandSent,
}

#[derive(Debug)]
struct ParticipantInner {
    state: ParticipantState,
    responses_seen: u64,
}

/// Participant kept by [`ShardTransactionRouter`](crate::router::ShardTransactionRouter)
#[derive(Debug)]
pub struct ShardParticipant {
    shard_id: ShardId,
    is_coordinator: bool,
    txn_number: TxnNumber,
    read_concern: Option<Document>,
    inner: Mutex<ParticipantInner>,
}

impl ShardParticipant {
    pub fn new(
        shard_id: ShardId,
        is_coordinator: bool,
        txn_number: TxnNumber,
        read_concern: Option<Document>,
    ) -> Self {
        Self {
            shard_id,
            is_coordinator,
            txn_number,
            read_concern,
            inner: Mutex::new(ParticipantInner {
                state: ParticipantState::MustStartTransaction,
                responses_seen: 0,
            }),
        }
    }

    pub fn is_coordinator(&self) -> bool {
        self.is_coordinator
    }

    pub fn txn_number(&self) -> TxnNumber {
        self.txn_number
    }

    /// True until the first command has been acknowledged as sent
    pub fn must_start_transaction(&self) -> bool {
        self.inner.lock().state == ParticipantState::MustStartTransaction
    }

    /// Number of times a response for this shard was observed
    pub fn responses_seen(&self) -> u64 {
        self.inner.lock().responses_seen
    }
}

impl TransactionParticipant for ShardParticipant {
    fn shard_id(&self) -> &ShardId {
        &self.shard_id
    }

    fn attach_txn_fields_if_needed(&self, cmd: &Document) -> Document {
        let starting = self.must_start_transaction();
        let mut stamped = cmd.clone();

        if starting {
            if let Some(read_concern) = &self.read_concern {
                if !stamped.contains_key("readConcern") {
                    stamped.insert(
                        "readConcern".to_string(),
                        Value::Object(read_concern.clone()),
                    );
                }
            }
            stamped.insert("startTransaction".to_string(), Value::Bool(true));
            if self.is_coordinator {
                stamped.insert("coordinator".to_string(), Value::Bool(true));
            }
        }

        stamped.insert("txnNumber".to_string(), Value::from(self.txn_number));
        stamped.insert("autocommit".to_string(), Value::Bool(false));
        stamped
    }

    fn mark_as_command_sent(&self) {
        let mut inner = self.inner.lock();
        inner.state = ParticipantState::CommandSent;
        inner.responses_seen += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn find_cmd() -> Document {
        match json!({"find": "orders", "filter": {"status": "open"}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_first_command_starts_transaction() {
        let mut read_concern = Document::new();
        read_concern.insert("level".to_string(), json!("snapshot"));
        let participant = ShardParticipant::new(ShardId::new("shard0"), true, 3, Some(read_concern));

        let stamped = participant.attach_txn_fields_if_needed(&find_cmd());
        assert_eq!(stamped["find"], json!("orders"));
        assert_eq!(stamped["txnNumber"], json!(3));
        assert_eq!(stamped["autocommit"], json!(false));
        assert_eq!(stamped["startTransaction"], json!(true));
        assert_eq!(stamped["coordinator"], json!(true));
        assert_eq!(stamped["readConcern"], json!({"level": "snapshot"}));
    }

    #[test]
    fn test_later_commands_only_carry_txn_number() {
        let participant = ShardParticipant::new(ShardId::new("shard1"), false, 9, None);
        participant.mark_as_command_sent();
        participant.mark_as_command_sent();

        let stamped = participant.attach_txn_fields_if_needed(&find_cmd());
        assert_eq!(stamped["txnNumber"], json!(9));
        assert_eq!(stamped["autocommit"], json!(false));
        assert!(!stamped.contains_key("startTransaction"));
        assert!(!stamped.contains_key("coordinator"));
        assert_eq!(participant.responses_seen(), 2);
    }

    #[test]
    fn test_caller_read_concern_is_kept() {
        let mut read_concern = Document::new();
        read_concern.insert("level".to_string(), json!("snapshot"));
        let participant = ShardParticipant::new(ShardId::new("shard0"), false, 1, Some(read_concern));

        let mut cmd = find_cmd();
        cmd.insert("readConcern".to_string(), json!({"level": "majority"}));
        let stamped = participant.attach_txn_fields_if_needed(&cmd);
        assert_eq!(stamped["readConcern"], json!({"level": "majority"}));
    }
}
