// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Logical session identifiers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a client logical session
///
/// Child sessions (used for internal retries on behalf of a client session)
/// carry the uuid of the session that spawned them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalSessionId {
    id: Uuid,
    parent: Option<Uuid>,
}

impl LogicalSessionId {
    /// Generate a fresh top-level session id
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self { id, parent: None }
    }

    /// Generate a fresh child of this session
    pub fn new_child(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: Some(self.id),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parent(&self) -> Option<Uuid> {
        self.parent
    }
}

impl Default for LogicalSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LogicalSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "{} (parent {})", self.id, parent),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Transaction number within a logical session
pub type TxnNumber = i64;

/// Selects the sessions visited by [`SessionCatalog::scan_sessions`]
///
/// [`SessionCatalog::scan_sessions`]: crate::session::SessionCatalog::scan_sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMatcher {
    /// Every session in the catalog
    All,
    /// Exactly one session
    Exact(LogicalSessionId),
    /// A session and all of its children
    Family(Uuid),
}

impl SessionMatcher {
    pub fn matches(&self, lsid: &LogicalSessionId) -> bool {
        match self {
            SessionMatcher::All => true,
            SessionMatcher::Exact(target) => target == lsid,
            SessionMatcher::Family(root) => lsid.id == *root || lsid.parent == Some(*root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_links_to_parent() {
        let parent = LogicalSessionId::new();
        let child = parent.new_child();

        assert_eq!(child.parent(), Some(parent.id()));
        assert_ne!(child, parent);
        assert!(child.to_string().contains("parent"));
    }

    #[test]
    fn test_family_matcher() {
        let parent = LogicalSessionId::new();
        let child = parent.new_child();
        let stranger = LogicalSessionId::new();

        let matcher = SessionMatcher::Family(parent.id());
        assert!(matcher.matches(&parent));
        assert!(matcher.matches(&child));
        assert!(!matcher.matches(&stranger));

        assert!(SessionMatcher::Exact(child).matches(&child));
        assert!(!SessionMatcher::Exact(child).matches(&parent));
        assert!(SessionMatcher::All.matches(&stranger));
    }
}
