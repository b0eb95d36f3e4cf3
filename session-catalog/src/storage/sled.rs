// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled-backed session table store
//!
//! Each table is a sled tree. A table exists once its uuid has been written
//! under [`TABLE_UUID_KEY`]; the write is a compare-and-swap so concurrent
//! creators agree on a single winner.

use super::traits::SessionTableStore;
use super::types::{StorageDriverError, StorageResult, StorageType};
use std::path::Path;
use uuid::Uuid;

const TABLE_UUID_KEY: &[u8] = b"__table_uuid__";

impl From<::sled::Error> for StorageDriverError {
    fn from(err: ::sled::Error) -> Self {
        match err {
            ::sled::Error::Io(io) => StorageDriverError::IoError(io),
            ::sled::Error::Unsupported(msg) => StorageDriverError::Unsupported(msg),
            corrupt @ ::sled::Error::Corruption { .. } => {
                StorageDriverError::CorruptMetadata(corrupt.to_string())
            }
            other => StorageDriverError::BackendSpecific(other.to_string()),
        }
    }
}

/// Sled session table store
pub struct SledSessionTableStore {
    db: ::sled::Db,
}

impl SledSessionTableStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = ::sled::open(path)?;
        Ok(Self { db })
    }

    fn tree_exists(&self, name: &str) -> bool {
        self.db
            .tree_names()
            .iter()
            .any(|tree| &tree[..] == name.as_bytes())
    }
}

impl SessionTableStore for SledSessionTableStore {
    fn table_uuid(&self, name: &str) -> StorageResult<Option<Uuid>> {
        // open_tree would create the tree, so check the name list first
        if !self.tree_exists(name) {
            return Ok(None);
        }

        let tree = self.db.open_tree(name)?;
        match tree.get(TABLE_UUID_KEY)? {
            Some(bytes) => Ok(Some(Uuid::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn create_table(&self, name: &str) -> StorageResult<Uuid> {
        let tree = self.db.open_tree(name)?;

        let uuid = Uuid::new_v4();
        let swapped = tree.compare_and_swap(
            TABLE_UUID_KEY,
            None::<&[u8]>,
            Some(uuid.as_bytes().to_vec()),
        )?;

        if swapped.is_err() {
            return Err(StorageDriverError::AlreadyExists(name.to_string()));
        }

        tree.flush()?;
        Ok(uuid)
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sled
    }
}
