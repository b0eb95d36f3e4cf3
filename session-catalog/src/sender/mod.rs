// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dispatching requests to shards

pub mod async_sender;
pub mod multi_statement;
pub mod request;

pub use async_sender::AsyncRequestsSender;
pub use multi_statement::MultiStatementTransactionRequestsSender;
pub use request::{
    Document, ReadPreference, RemoteError, Request, Response, RetryPolicy, SenderOptions,
};
