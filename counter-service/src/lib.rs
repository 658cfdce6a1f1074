// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The terminal front-end of the counter client: the text panel and the interactive commands.

#![deny(missing_docs)]

pub mod command;
pub mod view;
