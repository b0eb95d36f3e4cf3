// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session table store types and error handling

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Backing store type for the session transactions table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Sled - Pure Rust embedded database
    Sled,

    /// Memory - In-memory table registry for tests and embedded use
    #[default]
    Memory,
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageType::Sled),
            "memory" => Ok(StorageType::Memory),
            _ => Err(format!(
                "Unknown storage type: {}. Valid options: sled, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageType::Sled => "sled",
            StorageType::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Error type for session table store operations
#[derive(Debug)]
pub enum StorageDriverError {
    /// I/O related errors
    IoError(std::io::Error),

    /// The table already exists. Callers creating the table on step-up treat
    /// this as success.
    AlreadyExists(String),

    /// Stored table metadata could not be decoded
    CorruptMetadata(String),

    /// The requested backend is not compiled into this build
    Unsupported(String),

    /// Driver-specific error
    BackendSpecific(String),
}

impl StorageDriverError {
    /// True for the benign "table already exists" outcome
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StorageDriverError::AlreadyExists(_))
    }
}

impl std::fmt::Display for StorageDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageDriverError::IoError(e) => write!(f, "I/O error: {}", e),
            StorageDriverError::AlreadyExists(name) => write!(f, "Table already exists: {}", name),
            StorageDriverError::CorruptMetadata(e) => write!(f, "Corrupt table metadata: {}", e),
            StorageDriverError::Unsupported(e) => write!(f, "Unsupported storage backend: {}", e),
            StorageDriverError::BackendSpecific(e) => write!(f, "Storage driver error: {}", e),
        }
    }
}

impl std::error::Error for StorageDriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageDriverError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageDriverError {
    fn from(e: std::io::Error) -> Self {
        StorageDriverError::IoError(e)
    }
}

impl From<uuid::Error> for StorageDriverError {
    fn from(e: uuid::Error) -> Self {
        StorageDriverError::CorruptMetadata(e.to_string())
    }
}

/// Result type for session table store operations
pub type StorageResult<T> = Result<T, StorageDriverError>;
