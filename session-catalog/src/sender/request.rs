// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Requests, responses and dispatch options

use crate::router::ShardId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Command or reply body
pub type Document = serde_json::Map<String, serde_json::Value>;

/// One command addressed to one shard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub shard_id: ShardId,
    pub cmd: Document,
}

impl Request {
    pub fn new(shard_id: impl Into<ShardId>, cmd: Document) -> Self {
        Self {
            shard_id: shard_id.into(),
            cmd,
        }
    }
}

/// Failure reported for one shard by the underlying sender
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Shard {0} is unreachable")]
    HostUnreachable(ShardId),

    #[error("Command failed on shard {shard}: {message}")]
    CommandFailed { shard: ShardId, message: String },

    #[error("Request to shard {0} was cancelled")]
    Cancelled(ShardId),
}

/// The outcome for one shard, in the order the sender produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub shard_id: ShardId,
    pub sw_response: Result<Document, RemoteError>,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.sw_response.is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadPreference {
    #[default]
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RetryPolicy {
    #[default]
    NoRetry,
    Idempotent,
    NotIdempotent,
}

/// Options forwarded untouched to the underlying sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderOptions {
    pub db_name: String,
    #[serde(default)]
    pub read_preference: ReadPreference,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

impl SenderOptions {
    pub fn new(db_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            read_preference: ReadPreference::default(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_read_preference(mut self, read_preference: ReadPreference) -> Self {
        self.read_preference = read_preference;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }
}
