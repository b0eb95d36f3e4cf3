// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session table store trait

use super::types::{StorageResult, StorageType};
use uuid::Uuid;

/// Existence and creation of the table that persists session transaction
/// records.
///
/// The catalog never reads or writes rows through this trait; it only needs to
/// know whether the table exists and to create it when this node takes over
/// as primary.
pub trait SessionTableStore: Send + Sync {
    /// Uuid of the named table, or `None` if it does not exist
    fn table_uuid(&self, name: &str) -> StorageResult<Option<Uuid>>;

    /// Create the named table and return its uuid
    ///
    /// # Returns
    /// * `Ok(uuid)` - Table created
    /// * `Err(StorageDriverError::AlreadyExists)` - Another caller created it first
    fn create_table(&self, name: &str) -> StorageResult<Uuid>;

    /// Backend type of this store
    fn storage_type(&self) -> StorageType;
}
