/// Integration tests for the multi-statement transaction requests sender
///
/// These tests verify that:
/// 1. Without a transaction router, requests reach the sender untouched
/// 2. Under a router, every request is stamped with its participant's fields
/// 3. Every observed response marks its shard's participant, in response order

mod testutils;

use serde_json::json;
use session_catalog::sender::{ReadPreference, RetryPolicy};
use session_catalog::{
    LogicalSessionId, MultiStatementTransactionRequestsSender, OperationContext,
    OperationContextSession, Request, SenderOptions, SessionCatalog, ShardId,
    ShardTransactionRouter,
};
use std::sync::Arc;
use testutils::mock_sender::{doc, ScriptedSender};

fn update_batch() -> Vec<Request> {
    vec![
        Request::new("shard-a", doc(json!({"update": "accounts", "updates": [{"q": {"_id": 1}}]}))),
        Request::new("shard-b", doc(json!({"update": "accounts", "updates": [{"q": {"_id": 2}}]}))),
        Request::new("shard-c", doc(json!({"update": "accounts", "updates": [{"q": {"_id": 3}}]}))),
    ]
}

fn options() -> SenderOptions {
    SenderOptions::new("bank")
        .with_read_preference(ReadPreference::Primary)
        .with_retry_policy(RetryPolicy::Idempotent)
}

#[test]
fn test_requests_untouched_without_router() {
    testutils::init_logging();
    let op_ctx = OperationContext::new();
    let requests = update_batch();

    let mut sender =
        MultiStatementTransactionRequestsSender::new(&op_ctx, options(), &requests, ScriptedSender::new);
    assert_eq!(sender.inner().dispatched, requests);
    assert_eq!(sender.inner().options, options());

    let mut shards = Vec::new();
    while !sender.done() {
        shards.push(sender.next().shard_id);
    }
    assert_eq!(shards.len(), requests.len());
}

#[test]
fn test_every_request_is_stamped_once() {
    testutils::init_logging();
    let router = Arc::new(ShardTransactionRouter::new(21).with_read_concern("snapshot"));
    let op_ctx = OperationContext::new()
        .with_session(LogicalSessionId::new())
        .with_txn_number(21)
        .with_transaction_router(router.clone());
    let requests = update_batch();

    let sender =
        MultiStatementTransactionRequestsSender::new(&op_ctx, options(), &requests, ScriptedSender::new);
    let dispatched = &sender.inner().dispatched;

    assert_eq!(dispatched.len(), requests.len());
    for (original, stamped) in requests.iter().zip(dispatched) {
        assert_eq!(original.shard_id, stamped.shard_id);
        assert_eq!(stamped.cmd["update"], json!("accounts"));
        assert_eq!(stamped.cmd["updates"], original.cmd["updates"]);
        assert_eq!(stamped.cmd["txnNumber"], json!(21));
        assert_eq!(stamped.cmd["autocommit"], json!(false));
        assert_eq!(stamped.cmd["startTransaction"], json!(true));
        assert_eq!(stamped.cmd["readConcern"], json!({"level": "snapshot"}));
    }

    // Only the first shard contacted coordinates
    let coordinators: Vec<&ShardId> = dispatched
        .iter()
        .filter(|request| request.cmd.contains_key("coordinator"))
        .map(|request| &request.shard_id)
        .collect();
    assert_eq!(coordinators, vec![&ShardId::new("shard-a")]);
    assert_eq!(router.participant_count(), 3);
}

#[test]
fn test_each_response_marks_its_participant() {
    testutils::init_logging();
    let router = Arc::new(ShardTransactionRouter::new(4));
    let op_ctx = OperationContext::new().with_transaction_router(router.clone());

    let mut sender = MultiStatementTransactionRequestsSender::new(
        &op_ctx,
        options(),
        &update_batch(),
        |options, requests| ScriptedSender::new(options, requests).with_unreachable("shard-b"),
    );

    // Responses arrive in reverse order; bookkeeping follows them
    let first = sender.next();
    assert_eq!(first.shard_id, ShardId::new("shard-c"));
    assert_eq!(router.participant(&ShardId::new("shard-c")).unwrap().responses_seen(), 1);
    assert!(router.participant(&ShardId::new("shard-a")).unwrap().must_start_transaction());

    let mut failures = 0;
    while !sender.done() {
        if !sender.next().is_ok() {
            failures += 1;
        }
    }
    assert_eq!(failures, 1);

    for shard in ["shard-a", "shard-b", "shard-c"] {
        let participant = router.participant(&ShardId::new(shard)).unwrap();
        assert_eq!(participant.responses_seen(), 1, "shard {}", shard);
        assert!(!participant.must_start_transaction());
    }
}

#[test]
fn test_stop_retrying_passes_through() {
    let op_ctx = OperationContext::new();
    let mut sender = MultiStatementTransactionRequestsSender::new(
        &op_ctx,
        options(),
        &update_batch(),
        ScriptedSender::new,
    );
    sender.stop_retrying();
    assert!(sender.inner().stopped);
    assert!(!sender.done());
}

#[test]
fn test_statement_inside_checked_out_session() {
    testutils::init_logging();
    let catalog = SessionCatalog::default();
    let lsid = LogicalSessionId::new();
    let router = Arc::new(ShardTransactionRouter::new(8));
    let op_ctx = OperationContext::new()
        .with_session(lsid)
        .with_txn_number(8)
        .with_transaction_router(router.clone());

    let _scoped = OperationContextSession::new(&catalog, &op_ctx, true).unwrap();
    let session = OperationContextSession::get(&op_ctx).unwrap();
    assert!(session.txn_state().begin_or_continue(8));

    let mut sender = MultiStatementTransactionRequestsSender::new(
        &op_ctx,
        options(),
        &update_batch()[..1],
        ScriptedSender::new,
    );
    while !sender.done() {
        assert!(sender.next().is_ok());
    }

    assert_eq!(session.txn_state().active_txn_number(), Some(8));
    assert_eq!(router.coordinator_id(), Some(ShardId::new("shard-a")));
    assert!(catalog.is_checked_out(&lsid));
}
