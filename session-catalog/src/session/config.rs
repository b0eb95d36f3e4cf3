// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Session catalog configuration

use crate::session::error::SessionResult;
use crate::storage::{create_session_table_store, SessionTableStore, StorageType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a [`SessionCatalog`](crate::session::SessionCatalog)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionCatalogConfig {
    /// Longest a blocked checkout or drain wait sleeps before re-checking its
    /// operation for interruption
    pub interrupt_check_interval_ms: u64,

    /// Name of the table holding persisted session transaction records
    pub session_table_name: String,

    /// Backend holding the session table
    pub table_store: StorageType,
}

impl Default for SessionCatalogConfig {
    fn default() -> Self {
        Self {
            interrupt_check_interval_ms: 10,
            session_table_name: "config.transactions".to_string(),
            table_store: StorageType::Memory,
        }
    }
}

impl SessionCatalogConfig {
    /// Parse a configuration from JSON, filling omitted fields with defaults
    pub fn from_json_str(json: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn interrupt_check_interval(&self) -> Duration {
        Duration::from_millis(self.interrupt_check_interval_ms.max(1))
    }

    /// Open the configured session table store, rooted at `path` for
    /// persistent backends
    pub fn open_table_store<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> SessionResult<Box<dyn SessionTableStore>> {
        Ok(create_session_table_store(self.table_store, path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionCatalogConfig::default();
        assert_eq!(config.session_table_name, "config.transactions");
        assert_eq!(config.interrupt_check_interval(), Duration::from_millis(10));
        assert_eq!(config.table_store, StorageType::Memory);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            SessionCatalogConfig::from_json_str(r#"{"table_store": "sled"}"#).unwrap();
        assert_eq!(config.table_store, StorageType::Sled);
        assert_eq!(config.interrupt_check_interval_ms, 10);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config =
            SessionCatalogConfig::from_json_str(r#"{"interrupt_check_interval_ms": 0}"#).unwrap();
        assert_eq!(config.interrupt_check_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = SessionCatalogConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, crate::session::SessionError::Config(_)));
    }
}
