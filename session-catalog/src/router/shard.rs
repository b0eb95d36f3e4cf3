// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shard identifiers

use serde::{Deserialize, Serialize};

/// Name of a remote shard a request is dispatched to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardId(String);

impl ShardId {
    pub fn new(name: impl Into<String>) -> Self {
        ShardId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShardId {
    fn from(name: &str) -> Self {
        ShardId::new(name)
    }
}

impl From<String> for ShardId {
    fn from(name: String) -> Self {
        ShardId(name)
    }
}
