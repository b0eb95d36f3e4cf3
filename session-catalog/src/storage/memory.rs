// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory session table store

use super::traits::SessionTableStore;
use super::types::{StorageDriverError, StorageResult, StorageType};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory table registry
#[derive(Default)]
pub struct MemorySessionTableStore {
    tables: RwLock<HashMap<String, Uuid>>,
}

impl MemorySessionTableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionTableStore for MemorySessionTableStore {
    fn table_uuid(&self, name: &str) -> StorageResult<Option<Uuid>> {
        Ok(self.tables.read().get(name).copied())
    }

    fn create_table(&self, name: &str) -> StorageResult<Uuid> {
        match self.tables.write().entry(name.to_string()) {
            Entry::Occupied(_) => Err(StorageDriverError::AlreadyExists(name.to_string())),
            Entry::Vacant(slot) => Ok(*slot.insert(Uuid::new_v4())),
        }
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}
