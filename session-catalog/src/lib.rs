// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session Catalog - exclusive checkout of logical sessions
//!
//! An in-process registry that serializes access to the transaction state of
//! client logical sessions, plus the request sender that stamps shard
//! commands with multi-statement transaction fields.
//!
//! # Features
//!
//! - **Exclusive checkout**: at most one operation holds a session at a time
//! - **Interruptible waits**: every blocking wait honours kills and deadlines
//! - **Quiesce blocks**: stop new checkouts and drain in-flight ones
//! - **Invalidation**: drop cached transaction state on role changes
//! - **Transaction stamping**: attach participant fields to outgoing commands
//!
//! # Usage
//!
//! ```rust,ignore
//! use session_catalog::{LogicalSessionId, OperationContext, OperationContextSession, SessionCatalog};
//!
//! let catalog = SessionCatalog::default();
//! let op_ctx = OperationContext::new().with_session(LogicalSessionId::new());
//!
//! let scoped = OperationContextSession::new(&catalog, &op_ctx, true)?;
//! if let Some(session) = OperationContextSession::get(&op_ctx) {
//!     session.txn_state().begin_or_continue(1);
//! }
//! drop(scoped); // checks the session back in
//! ```

pub mod operation;
pub mod router;
pub mod sender;
pub mod session;
pub mod storage;

pub use operation::{InterruptReason, OperationContext, OperationId};
pub use router::{
    ShardId, ShardParticipant, ShardTransactionRouter, TransactionParticipant, TransactionRouter,
};
pub use sender::{
    AsyncRequestsSender, Document, MultiStatementTransactionRequestsSender, Request, Response,
    SenderOptions,
};
pub use session::{
    LogicalSessionId, OperationContextSession, PreventCheckoutsBlock, ScopedCheckedOutSession,
    ScopedSession, Session, SessionBinding, SessionCatalog, SessionCatalogConfig, SessionError,
    SessionMatcher, SessionResult, SessionTransactionState, TxnNumber,
};
pub use storage::{create_session_table_store, SessionTableStore, StorageType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
