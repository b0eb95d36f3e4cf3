// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session catalog with exclusive checkout
//!
//! The catalog maps logical session ids to their runtime entries and is the
//! single serialization point for mutating a session's transaction state: an
//! operation must check the session out, and at most one operation holds a
//! given session at a time.
//!
//! # Locking
//!
//! One mutex guards the session map, the checkout gate and the checked-out
//! counter. Every condition variable in this module (the gate, the drain
//! signal and each entry's availability signal) is paired with that mutex.
//! Lock order is catalog mutex, then a session's transaction state. The
//! operation context's binding lock is never held while the catalog mutex is
//! acquired.

use crate::operation::{OperationContext, OperationId};
use crate::session::config::SessionCatalogConfig;
use crate::session::error::{protocol_violation, SessionError, SessionResult};
use crate::session::handle::{ScopedCheckedOutSession, ScopedSession};
use crate::session::id::{LogicalSessionId, SessionMatcher};
use crate::session::transaction_state::SessionTransactionState;
use crate::storage::SessionTableStore;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

/// A logical session as seen by its owner
pub struct Session {
    lsid: LogicalSessionId,
    txn_state: Mutex<SessionTransactionState>,
}

impl Session {
    fn new(lsid: LogicalSessionId) -> Self {
        Self {
            lsid,
            txn_state: Mutex::new(SessionTransactionState::new()),
        }
    }

    pub fn session_id(&self) -> &LogicalSessionId {
        &self.lsid
    }

    /// Lock the transaction state.
    ///
    /// Only the operation holding the checkout may mutate it. Do not keep the
    /// guard across calls into the catalog.
    pub fn txn_state(&self) -> MutexGuard<'_, SessionTransactionState> {
        self.txn_state.lock()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("lsid", &self.lsid).finish()
    }
}

/// Shared part of a catalog entry; outlives its map slot while referenced
pub(crate) struct SessionRuntimeInfo {
    pub(crate) session: Session,
    /// Signalled whenever the entry becomes free or its wait queue changes
    pub(crate) available: Condvar,
}

struct CatalogEntry {
    runtime: Arc<SessionRuntimeInfo>,
    /// Operation holding the checkout, if any
    owner: Option<OperationId>,
    /// Wait tickets of blocked checkouts, ascending; the head goes next
    waiters: VecDeque<u64>,
}

impl CatalogEntry {
    fn new(lsid: LogicalSessionId) -> Self {
        Self {
            runtime: Arc::new(SessionRuntimeInfo {
                session: Session::new(lsid),
                available: Condvar::new(),
            }),
            owner: None,
            waiters: VecDeque::new(),
        }
    }

    fn enqueue(&mut self, ticket: u64) {
        if !self.waiters.contains(&ticket) {
            let position = self.waiters.partition_point(|queued| *queued < ticket);
            self.waiters.insert(position, ticket);
        }
    }

    fn is_checked_out(&self) -> bool {
        self.owner.is_some()
    }

    fn can_admit(&self, ticket: u64) -> bool {
        !self.is_checked_out() && self.waiters.front() == Some(&ticket)
    }
}

struct CatalogState {
    sessions: BTreeMap<LogicalSessionId, CatalogEntry>,
    allow_checkouts: bool,
    num_checked_out: usize,
    next_wait_ticket: u64,
}

impl CatalogState {
    fn get_or_create(&mut self, lsid: LogicalSessionId) -> &mut CatalogEntry {
        self.sessions
            .entry(lsid)
            .or_insert_with(|| CatalogEntry::new(lsid))
    }

    fn issue_ticket(&mut self) -> u64 {
        let ticket = self.next_wait_ticket;
        self.next_wait_ticket += 1;
        ticket
    }

    /// Drop an abandoned checkout's place in line and let the next waiter
    /// re-evaluate.
    fn abandon_wait(&mut self, lsid: &LogicalSessionId, ticket: u64) {
        if let Some(entry) = self.sessions.get_mut(lsid) {
            if let Some(position) = entry.waiters.iter().position(|queued| *queued == ticket) {
                entry.waiters.remove(position);
                entry.runtime.available.notify_all();
            }
        }
    }
}

/// Invalidate one entry, removing it unless it is checked out.
///
/// Checked-out entries stay in the map because their owner must find them to
/// check back in. Returns true if the entry was removed.
fn invalidate_entry(
    sessions: &mut BTreeMap<LogicalSessionId, CatalogEntry>,
    lsid: &LogicalSessionId,
) -> bool {
    let Some(entry) = sessions.get(lsid) else {
        return false;
    };

    entry.runtime.session.txn_state().invalidate();
    if entry.is_checked_out() {
        return false;
    }

    if let Some(removed) = sessions.remove(lsid) {
        // Queued checkouts re-resolve the id and join the replacement entry
        removed.runtime.available.notify_all();
    }
    true
}

pub(crate) struct CatalogShared {
    state: Mutex<CatalogState>,
    checkouts_allowed: Condvar,
    all_checked_in: Condvar,
    config: SessionCatalogConfig,
}

impl CatalogShared {
    /// Return a checked-out session to availability
    pub(crate) fn release_session(&self, runtime: &Arc<SessionRuntimeInfo>) {
        let lsid = runtime.session.session_id();
        let mut state = self.state.lock();

        let Some(entry) = state.sessions.get_mut(lsid) else {
            protocol_violation(&format!("released session {} is not in the catalog", lsid));
        };
        if !entry.is_checked_out() {
            protocol_violation(&format!("released session {} was not checked out", lsid));
        }
        if !Arc::ptr_eq(&entry.runtime, runtime) {
            protocol_violation(&format!(
                "released session {} does not match the catalog entry",
                lsid
            ));
        }

        entry.owner = None;
        entry.runtime.available.notify_all();

        state.num_checked_out -= 1;
        if state.num_checked_out == 0 {
            self.all_checked_in.notify_all();
        }
    }

    pub(crate) fn block_checkouts(&self) {
        let mut state = self.state.lock();
        if !state.allow_checkouts {
            protocol_violation("checkouts are already blocked by another block");
        }
        state.allow_checkouts = false;
        log::info!(
            "Blocked session checkouts with {} sessions checked out",
            state.num_checked_out
        );
    }

    pub(crate) fn unblock_checkouts(&self) {
        let mut state = self.state.lock();
        if state.allow_checkouts {
            protocol_violation("unblocking checkouts that were not blocked");
        }
        state.allow_checkouts = true;
        self.checkouts_allowed.notify_all();
        log::info!("Resumed session checkouts");
    }

    pub(crate) fn wait_for_all_checked_in(&self, op_ctx: &OperationContext) -> SessionResult<()> {
        let interval = self.config.interrupt_check_interval();
        let mut state = self.state.lock();

        if state.allow_checkouts {
            protocol_violation("waiting for sessions to drain while checkouts are allowed");
        }
        while state.num_checked_out > 0 {
            op_ctx.wait_for_condition_or_interrupt(&self.all_checked_in, &mut state, interval)?;
        }

        log::info!("All sessions checked in");
        Ok(())
    }
}

/// Registry of logical sessions and their checkout state
///
/// Cloning yields another handle to the same catalog. Construct one per
/// process context and pass it to every call site that needs it. Every
/// checked-out handle keeps the shared state alive, so the registry can never
/// be torn down underneath a checkout.
#[derive(Clone)]
pub struct SessionCatalog {
    shared: Arc<CatalogShared>,
}

impl SessionCatalog {
    pub fn new(config: SessionCatalogConfig) -> Self {
        Self {
            shared: Arc::new(CatalogShared {
                state: Mutex::new(CatalogState {
                    sessions: BTreeMap::new(),
                    allow_checkouts: true,
                    num_checked_out: 0,
                    next_wait_ticket: 0,
                }),
                checkouts_allowed: Condvar::new(),
                all_checked_in: Condvar::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &SessionCatalogConfig {
        &self.shared.config
    }

    pub(crate) fn shared(&self) -> &Arc<CatalogShared> {
        &self.shared
    }

    /// Check out the session named by `op_ctx`, blocking while checkouts are
    /// blocked or another operation holds the session.
    ///
    /// Waiters for the same session are admitted in arrival order. Both waits
    /// abort when the operation is killed or passes its deadline, in which
    /// case nothing is held.
    ///
    /// # Panics
    /// If `op_ctx` has no logical session id, or already holds the session.
    pub fn check_out_session(
        &self,
        op_ctx: &OperationContext,
    ) -> SessionResult<ScopedCheckedOutSession> {
        let Some(lsid) = op_ctx.logical_session_id().copied() else {
            protocol_violation("checking out a session requires a logical session id");
        };
        let op_id = op_ctx.op_id();

        // The binding lock is released before the catalog lock is taken
        let already_bound = op_ctx.session_binding().lock().is_some();
        if already_bound {
            protocol_violation(&format!(
                "operation {} checked out session {} while already bound to a session",
                op_id, lsid
            ));
        }

        let shared = &self.shared;
        let interval = shared.config.interrupt_check_interval();
        let mut state = shared.state.lock();
        if state.sessions.get(&lsid).and_then(|entry| entry.owner) == Some(op_id) {
            drop(state);
            protocol_violation(&format!(
                "operation {} already holds session {}",
                op_id, lsid
            ));
        }
        let ticket = state.issue_ticket();

        loop {
            if !state.allow_checkouts {
                if let Err(err) = op_ctx.wait_for_condition_or_interrupt(
                    &shared.checkouts_allowed,
                    &mut state,
                    interval,
                ) {
                    state.abandon_wait(&lsid, ticket);
                    return Err(err);
                }
                continue;
            }

            let entry = state.get_or_create(lsid);
            entry.enqueue(ticket);

            if entry.can_admit(ticket) {
                entry.waiters.pop_front();
                entry.owner = Some(op_id);
                let runtime = Arc::clone(&entry.runtime);
                state.num_checked_out += 1;

                log::debug!("Operation {} checked out session {}", op_id, lsid);
                return Ok(ScopedCheckedOutSession::new(
                    ScopedSession::new(runtime),
                    Arc::clone(shared),
                ));
            }

            let runtime = Arc::clone(&entry.runtime);
            if let Err(err) =
                op_ctx.wait_for_condition_or_interrupt(&runtime.available, &mut state, interval)
            {
                state.abandon_wait(&lsid, ticket);
                return Err(err);
            }
        }
    }

    /// Get or create the entry for `lsid` without checking it out
    ///
    /// # Panics
    /// If `op_ctx` already runs under a session or transaction number.
    pub fn get_or_create_session(
        &self,
        op_ctx: &OperationContext,
        lsid: &LogicalSessionId,
    ) -> ScopedSession {
        if op_ctx.logical_session_id().is_some() || op_ctx.txn_number().is_some() {
            protocol_violation(&format!(
                "operation {} already runs under a session",
                op_ctx.op_id()
            ));
        }

        let mut state = self.shared.state.lock();
        ScopedSession::new(Arc::clone(&state.get_or_create(*lsid).runtime))
    }

    /// Invalidate the transaction state of one session, or of all sessions.
    ///
    /// Invalidated sessions that are not checked out leave the catalog.
    /// Returns the number of sessions invalidated.
    pub fn invalidate_sessions(
        &self,
        op_ctx: &OperationContext,
        single: Option<&LogicalSessionId>,
    ) -> SessionResult<usize> {
        if op_ctx.logical_session_id().is_some() {
            return Err(SessionError::IllegalOperation(format!(
                "Direct writes against {} cannot be performed using a transaction or on a session",
                self.shared.config.session_table_name
            )));
        }

        let mut state = self.shared.state.lock();
        let targets: Vec<LogicalSessionId> = match single {
            Some(lsid) if state.sessions.contains_key(lsid) => vec![*lsid],
            Some(_) => Vec::new(),
            None => state.sessions.keys().copied().collect(),
        };

        let mut removed = 0;
        for lsid in &targets {
            if invalidate_entry(&mut state.sessions, lsid) {
                removed += 1;
            }
        }

        if !targets.is_empty() {
            log::info!(
                "Invalidated {} sessions ({} removed, {} still checked out)",
                targets.len(),
                removed,
                targets.len() - removed
            );
        }
        Ok(targets.len())
    }

    /// Visit every session matching `matcher` under the catalog lock.
    ///
    /// `visit` must not call back into the catalog.
    pub fn scan_sessions<F>(&self, op_ctx: &OperationContext, matcher: &SessionMatcher, mut visit: F)
    where
        F: FnMut(&OperationContext, &Session),
    {
        let state = self.shared.state.lock();

        log::debug!(
            "Beginning scanSessions. Scanning {} sessions.",
            state.sessions.len()
        );

        for (lsid, entry) in state.sessions.iter() {
            if matcher.matches(lsid) {
                visit(op_ctx, &entry.runtime.session);
            }
        }
    }

    /// Prepare the catalog for this node becoming primary: drop all cached
    /// transaction state and make sure the session table exists.
    pub fn on_step_up(
        &self,
        op_ctx: &OperationContext,
        store: &dyn SessionTableStore,
    ) -> SessionResult<()> {
        self.invalidate_sessions(op_ctx, None)?;

        let table = &self.shared.config.session_table_name;
        match store.create_table(table) {
            Ok(uuid) => {
                log::info!("Created the {} table with uuid {}", table, uuid);
                Ok(())
            }
            Err(err) if err.is_already_exists() => {
                log::info!("The {} table already exists", table);
                Ok(())
            }
            Err(source) => Err(SessionError::TableCreation {
                table: table.clone(),
                source,
            }),
        }
    }

    /// Uuid of the session table, or `None` if it has not been created
    pub fn transaction_table_uuid(
        &self,
        store: &dyn SessionTableStore,
    ) -> SessionResult<Option<Uuid>> {
        Ok(store.table_uuid(&self.shared.config.session_table_name)?)
    }

    pub fn session_count(&self) -> usize {
        self.shared.state.lock().sessions.len()
    }

    pub fn checked_out_count(&self) -> usize {
        self.shared.state.lock().num_checked_out
    }

    pub fn contains_session(&self, lsid: &LogicalSessionId) -> bool {
        self.shared.state.lock().sessions.contains_key(lsid)
    }

    pub fn is_checked_out(&self, lsid: &LogicalSessionId) -> bool {
        self.shared
            .state
            .lock()
            .sessions
            .get(lsid)
            .map(|entry| entry.is_checked_out())
            .unwrap_or(false)
    }

    /// Number of checkouts queued behind the current holder of `lsid`
    pub fn waiter_count(&self, lsid: &LogicalSessionId) -> usize {
        self.shared
            .state
            .lock()
            .sessions
            .get(lsid)
            .map(|entry| entry.waiters.len())
            .unwrap_or(0)
    }

    pub fn checkouts_allowed(&self) -> bool {
        self.shared.state.lock().allow_checkouts
    }
}

impl Default for SessionCatalog {
    fn default() -> Self {
        Self::new(SessionCatalogConfig::default())
    }
}

impl std::fmt::Debug for SessionCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("SessionCatalog")
            .field("sessions", &state.sessions.len())
            .field("checked_out", &state.num_checked_out)
            .field("allow_checkouts", &state.allow_checkouts)
            .finish()
    }
}
