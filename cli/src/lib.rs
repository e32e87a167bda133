// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Phish-Vigil CLI library - exposes testable components

pub mod banner;
pub mod commands;
pub mod runtime;
