// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session table store factory

use super::memory::MemorySessionTableStore;
use super::traits::SessionTableStore;
use super::types::{StorageResult, StorageType};
use std::path::Path;

/// Create a session table store for the configured backend
///
/// # Arguments
/// * `storage_type` - Backend to instantiate
/// * `path` - Filesystem location for persistent backends (ignored for memory)
pub fn create_session_table_store<P: AsRef<Path>>(
    storage_type: StorageType,
    path: P,
) -> StorageResult<Box<dyn SessionTableStore>> {
    match storage_type {
        StorageType::Memory => Ok(Box::new(MemorySessionTableStore::new())),
        #[cfg(feature = "sled-backend")]
        StorageType::Sled => {
            use crate::storage::sled::SledSessionTableStore;
            let store = SledSessionTableStore::open(path)?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "sled-backend"))]
        StorageType::Sled => {
            let _ = path;
            Err(super::types::StorageDriverError::Unsupported(
                "sled backend requires the sled-backend feature".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_memory_store() {
        let store = create_session_table_store(StorageType::Memory, "unused").unwrap();
        assert_eq!(store.storage_type(), StorageType::Memory);
    }

    #[cfg(feature = "sled-backend")]
    #[test]
    fn test_create_sled_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = create_session_table_store(StorageType::Sled, temp_dir.path()).unwrap();
        assert_eq!(store.storage_type(), StorageType::Sled);
    }
}
