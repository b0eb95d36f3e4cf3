// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Requests sender for operations inside a multi-statement transaction
//!
//! Wraps any [`AsyncRequestsSender`]. When the operation runs under a
//! transaction router, each outgoing command is stamped by its shard's
//! participant before dispatch, and every response observed marks that
//! participant as having sent a command. Without a router the wrapper is a
//! pure pass-through.

use crate::operation::OperationContext;
use crate::sender::async_sender::AsyncRequestsSender;
use crate::sender::request::{Request, Response, SenderOptions};

/// Stamp `requests` with the transaction fields of the operation's router
fn attach_txn_details(op_ctx: &OperationContext, requests: &[Request]) -> Vec<Request> {
    let Some(router) = op_ctx.transaction_router() else {
        return requests.to_vec();
    };

    requests
        .iter()
        .map(|request| {
            let participant = router.get_or_create_participant(&request.shard_id);
            Request {
                shard_id: request.shard_id.clone(),
                cmd: participant.attach_txn_fields_if_needed(&request.cmd),
            }
        })
        .collect()
}

pub struct MultiStatementTransactionRequestsSender<'a, S> {
    op_ctx: &'a OperationContext,
    sender: S,
}

impl<'a, S: AsyncRequestsSender> MultiStatementTransactionRequestsSender<'a, S> {
    /// Stamp `requests` and hand them to `make_sender`, which builds the
    /// underlying sender that dispatches them.
    pub fn new<F>(
        op_ctx: &'a OperationContext,
        options: SenderOptions,
        requests: &[Request],
        make_sender: F,
    ) -> Self
    where
        F: FnOnce(SenderOptions, Vec<Request>) -> S,
    {
        let stamped = attach_txn_details(op_ctx, requests);
        log::debug!(
            "Operation {} dispatching {} requests against {}",
            op_ctx.op_id(),
            stamped.len(),
            options.db_name
        );
        Self {
            op_ctx,
            sender: make_sender(options, stamped),
        }
    }

    pub fn done(&mut self) -> bool {
        self.sender.done()
    }

    /// Next response from the underlying sender, recorded against its
    /// shard's participant
    pub fn next(&mut self) -> Response {
        let response = self.sender.next();

        if let Some(router) = self.op_ctx.transaction_router() {
            router
                .get_or_create_participant(&response.shard_id)
                .mark_as_command_sent();
        }

        response
    }

    pub fn stop_retrying(&mut self) {
        self.sender.stop_retrying();
    }

    /// The wrapped sender
    pub fn inner(&self) -> &S {
        &self.sender
    }
}

impl<S: AsyncRequestsSender> AsyncRequestsSender for MultiStatementTransactionRequestsSender<'_, S> {
    fn done(&mut self) -> bool {
        MultiStatementTransactionRequestsSender::done(self)
    }

    fn next(&mut self) -> Response {
        MultiStatementTransactionRequestsSender::next(self)
    }

    fn stop_retrying(&mut self) {
        MultiStatementTransactionRequestsSender::stop_retrying(self)
    }
}
