// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction routing for multi-shard transactions

pub mod participant;
pub mod shard;
pub mod transaction_router;

pub use participant::{ShardParticipant, TransactionParticipant};
pub use shard::ShardId;
pub use transaction_router::{ShardTransactionRouter, TransactionRouter};
