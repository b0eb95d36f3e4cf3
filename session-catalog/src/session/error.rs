// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session catalog error types

use crate::operation::{InterruptReason, OperationId};
use crate::storage::StorageDriverError;
use thiserror::Error;

/// Recoverable failures surfaced to callers of the session catalog
///
/// Invariant violations are not represented here; they abort through
/// [`protocol_violation`].
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("operation {op_id} was interrupted: {reason}")]
    Interrupted {
        op_id: OperationId,
        reason: InterruptReason,
    },

    #[error("operation {op_id} exceeded its time limit")]
    ExceededTimeLimit { op_id: OperationId },

    #[error("Illegal operation: {0}")]
    IllegalOperation(String),

    #[error("Failed to create the {table} table: {source}")]
    TableCreation {
        table: String,
        #[source]
        source: StorageDriverError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageDriverError),
}

impl SessionError {
    /// True when a blocking wait was aborted through the caller's context
    pub fn is_interruption(&self) -> bool {
        matches!(
            self,
            SessionError::Interrupted { .. } | SessionError::ExceededTimeLimit { .. }
        )
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(error: serde_json::Error) -> Self {
        SessionError::Config(error.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Abort on a broken checkout protocol invariant.
///
/// Continuing after one of these risks two owners mutating the same
/// transaction state, so the failure is never returned as a value.
#[track_caller]
pub fn protocol_violation(message: &str) -> ! {
    log::error!("Session protocol violation: {}", message);
    panic!("session protocol violation: {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interruption_classification() {
        let killed = SessionError::Interrupted {
            op_id: OperationId::from_u64(7),
            reason: InterruptReason::Killed,
        };
        assert!(killed.is_interruption());
        assert_eq!(
            killed.to_string(),
            "operation op_7 was interrupted: operation was killed"
        );

        let timed_out = SessionError::ExceededTimeLimit {
            op_id: OperationId::from_u64(8),
        };
        assert!(timed_out.is_interruption());

        assert!(!SessionError::IllegalOperation("x".to_string()).is_interruption());
    }

    #[test]
    #[should_panic(expected = "session protocol violation")]
    fn test_protocol_violation_panics() {
        protocol_violation("released a session that was not checked out");
    }
}
