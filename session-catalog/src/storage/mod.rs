// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Backing store for the session transactions table
//!
//! The session catalog only needs to know whether the table exists and to
//! create it when the node steps up. Row persistence lives elsewhere.
//!
//! ```text
//! SessionCatalog::on_step_up
//!     ↓
//! SessionTableStore (existence + creation)
//!     ↓
//! Concrete Implementations (Memory, Sled)
//! ```

pub mod factory;
pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;
pub mod traits;
pub mod types;

pub use factory::create_session_table_store;
pub use memory::MemorySessionTableStore;
#[cfg(feature = "sled-backend")]
pub use self::sled::SledSessionTableStore;
pub use traits::SessionTableStore;
pub use types::{StorageDriverError, StorageResult, StorageType};
