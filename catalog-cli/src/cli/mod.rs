// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for the FlexiMart catalog
//!
//! Command definitions, handlers and result formatting.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, LogLevel};
