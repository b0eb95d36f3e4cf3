// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Logical sessions and their exclusive checkout
//!
//! This module provides:
//! - The [`SessionCatalog`] registry, mapping logical session ids to entries
//! - Exclusive checkout through [`ScopedCheckedOutSession`]
//! - Binding a checkout to an operation with [`OperationContextSession`]
//! - Blocking new checkouts with [`PreventCheckoutsBlock`]
//! - Invalidation and scanning of cached transaction state
//!
//! A session's [`SessionTransactionState`] may only be mutated by the
//! operation that currently has the session checked out.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handle;
pub mod id;
pub mod operation_session;
pub mod quiesce;
pub mod transaction_state;

pub use catalog::{Session, SessionCatalog};
pub use config::SessionCatalogConfig;
pub use error::{protocol_violation, SessionError, SessionResult};
pub use handle::{ScopedCheckedOutSession, ScopedSession};
pub use id::{LogicalSessionId, SessionMatcher, TxnNumber};
pub use operation_session::{OperationContextSession, SessionBinding};
pub use quiesce::PreventCheckoutsBlock;
pub use transaction_state::SessionTransactionState;
