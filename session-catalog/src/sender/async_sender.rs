// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Contract of a multi-shard requests sender

use crate::sender::request::Response;

/// Dispatches a batch of requests and yields one response per request
///
/// Implementations own the transport. Callers drive them with
/// `while !sender.done() { let response = sender.next(); ... }`.
pub trait AsyncRequestsSender {
    /// True once every response has been returned by [`next`](Self::next)
    fn done(&mut self) -> bool;

    /// Block until the next response is available
    fn next(&mut self) -> Response;

    /// Stop retrying failed requests; outstanding ones still produce a response
    fn stop_retrying(&mut self);
}
