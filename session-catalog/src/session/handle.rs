// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Handles to catalog entries

use crate::session::catalog::{CatalogShared, Session, SessionRuntimeInfo};
use std::ops::Deref;
use std::sync::Arc;

/// Shared, non-exclusive reference to a catalog entry
///
/// Keeps the entry alive even if the catalog evicts it. Holding one does not
/// grant permission to mutate the session's transaction state.
#[derive(Clone)]
pub struct ScopedSession {
    runtime: Arc<SessionRuntimeInfo>,
}

impl ScopedSession {
    pub(crate) fn new(runtime: Arc<SessionRuntimeInfo>) -> Self {
        Self { runtime }
    }

    pub fn get(&self) -> &Session {
        &self.runtime.session
    }

    /// True if both handles refer to the same catalog entry
    pub fn ptr_eq(&self, other: &ScopedSession) -> bool {
        Arc::ptr_eq(&self.runtime, &other.runtime)
    }
}

impl Deref for ScopedSession {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.get()
    }
}

impl std::fmt::Debug for ScopedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ScopedSession")
            .field(self.session_id())
            .finish()
    }
}

/// Exclusive ownership of a checked-out session
///
/// Dropping the handle checks the session back in. There is exactly one live
/// handle per checked-out entry; it cannot be cloned.
pub struct ScopedCheckedOutSession {
    session: ScopedSession,
    catalog: Arc<CatalogShared>,
}

impl ScopedCheckedOutSession {
    pub(crate) fn new(session: ScopedSession, catalog: Arc<CatalogShared>) -> Self {
        Self { session, catalog }
    }

    pub fn get(&self) -> &Session {
        self.session.get()
    }

    /// Non-exclusive handle to the same entry
    pub fn session(&self) -> &ScopedSession {
        &self.session
    }
}

impl Deref for ScopedCheckedOutSession {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.get()
    }
}

impl Drop for ScopedCheckedOutSession {
    fn drop(&mut self) {
        self.catalog.release_session(&self.session.runtime);
    }
}

impl std::fmt::Debug for ScopedCheckedOutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ScopedCheckedOutSession")
            .field(self.session_id())
            .finish()
    }
}
