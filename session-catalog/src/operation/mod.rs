// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Operation contexts

pub mod context;

pub use context::{InterruptReason, OperationContext, OperationId};
