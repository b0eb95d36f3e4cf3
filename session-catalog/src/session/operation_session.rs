// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Binding a checked-out session to one operation
//!
//! [`OperationContextSession`] checks out the operation's session on entry and
//! checks it back in when dropped. The handle itself is stored in the
//! operation context so code further down the call chain can reach the
//! session through [`OperationContextSession::get`].
//!
//! A nested sub-operation running on the same context (an internal command
//! issued on behalf of the outer one) must not check out again. It says so by
//! entering through [`OperationContextSession::nested`] and then borrows the
//! outer binding without releasing it.

use crate::operation::OperationContext;
use crate::session::catalog::SessionCatalog;
use crate::session::error::{protocol_violation, SessionResult};
use crate::session::handle::ScopedSession;

/// What a binding did on entry, and therefore must undo on exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBinding {
    /// No session was checked out
    Unbound,
    /// This binding checked the session out and releases it on drop
    Owning,
    /// A nested sub-operation reusing the outer binding
    Borrowing,
}

/// RAII binding of an operation to its checked-out session
pub struct OperationContextSession<'a> {
    op_ctx: &'a OperationContext,
    binding: SessionBinding,
}

impl<'a> OperationContextSession<'a> {
    /// Bind a top-level operation, checking out its session if it has one and
    /// `check_out` is set.
    ///
    /// # Panics
    /// If the context already has a session bound.
    pub fn new(
        catalog: &SessionCatalog,
        op_ctx: &'a OperationContext,
        check_out: bool,
    ) -> SessionResult<Self> {
        Self::enter(catalog, op_ctx, check_out, false)
    }

    /// Bind a nested sub-operation. Reuses the outer binding when there is
    /// one; otherwise behaves like [`new`](Self::new).
    pub fn nested(
        catalog: &SessionCatalog,
        op_ctx: &'a OperationContext,
        check_out: bool,
    ) -> SessionResult<Self> {
        Self::enter(catalog, op_ctx, check_out, true)
    }

    fn enter(
        catalog: &SessionCatalog,
        op_ctx: &'a OperationContext,
        check_out: bool,
        nested: bool,
    ) -> SessionResult<Self> {
        let Some(lsid) = op_ctx.logical_session_id().copied() else {
            return Ok(Self::with_binding(op_ctx, SessionBinding::Unbound));
        };
        if !check_out {
            return Ok(Self::with_binding(op_ctx, SessionBinding::Unbound));
        }

        if op_ctx.session_binding().lock().is_some() {
            if !nested {
                protocol_violation(&format!(
                    "operation {} checked out session {} twice",
                    op_ctx.op_id(),
                    lsid
                ));
            }
            return Ok(Self::with_binding(op_ctx, SessionBinding::Borrowing));
        }

        let checked_out = catalog.check_out_session(op_ctx)?;
        if checked_out.session_id() != &lsid {
            protocol_violation("checked-out session does not match the operation's session");
        }

        let mut binding = op_ctx.session_binding().lock();
        if binding.is_some() {
            // Release outside the binding lock before aborting
            drop(binding);
            drop(checked_out);
            protocol_violation(&format!(
                "operation {} gained a session binding during checkout",
                op_ctx.op_id()
            ));
        }
        checked_out.txn_state().set_current_operation(op_ctx.op_id());
        *binding = Some(checked_out);
        drop(binding);

        Ok(Self::with_binding(op_ctx, SessionBinding::Owning))
    }

    fn with_binding(op_ctx: &'a OperationContext, binding: SessionBinding) -> Self {
        Self { op_ctx, binding }
    }

    pub fn binding(&self) -> SessionBinding {
        self.binding
    }

    /// The session bound to `op_ctx`, if any
    pub fn get(op_ctx: &OperationContext) -> Option<ScopedSession> {
        op_ctx
            .session_binding()
            .lock()
            .as_ref()
            .map(|checked_out| checked_out.session().clone())
    }
}

impl Drop for OperationContextSession<'_> {
    fn drop(&mut self) {
        if self.binding != SessionBinding::Owning {
            return;
        }

        // Detach under the context lock, but release outside it: release
        // takes the catalog lock, and the context lock must never be held
        // while acquiring that.
        let detached = {
            let mut binding = self.op_ctx.session_binding().lock();
            if let Some(checked_out) = binding.as_ref() {
                checked_out.txn_state().clear_current_operation();
            }
            binding.take()
        };
        drop(detached);
    }
}
