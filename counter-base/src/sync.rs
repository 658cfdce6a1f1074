// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synchronization primitives re-exported for the rest of the workspace.

pub use once_cell::sync::Lazy;
