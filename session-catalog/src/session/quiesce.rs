// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Blocking new checkouts while the node changes role
//!
//! A [`PreventCheckoutsBlock`] closes the catalog's checkout gate for its
//! whole lifetime. Operations that already hold a session keep running; new
//! checkouts for any session wait until the block is dropped. Combined with
//! [`PreventCheckoutsBlock::wait_for_all_sessions_to_be_checked_in`] this
//! gives a point at which no session is being mutated.

use crate::operation::OperationContext;
use crate::session::catalog::{CatalogShared, SessionCatalog};
use crate::session::error::SessionResult;
use std::sync::Arc;

/// Scoped barrier against new session checkouts
///
/// Only one block may be alive per catalog.
pub struct PreventCheckoutsBlock {
    catalog: Arc<CatalogShared>,
}

impl PreventCheckoutsBlock {
    /// Close the checkout gate
    ///
    /// # Panics
    /// If another block is already alive on this catalog.
    pub fn new(catalog: &SessionCatalog) -> Self {
        let catalog = Arc::clone(catalog.shared());
        catalog.block_checkouts();
        Self { catalog }
    }

    /// Block until no session is checked out, or until `op_ctx` is
    /// interrupted
    pub fn wait_for_all_sessions_to_be_checked_in(
        &self,
        op_ctx: &OperationContext,
    ) -> SessionResult<()> {
        self.catalog.wait_for_all_checked_in(op_ctx)
    }
}

impl Drop for PreventCheckoutsBlock {
    fn drop(&mut self) {
        self.catalog.unblock_checkouts();
    }
}
