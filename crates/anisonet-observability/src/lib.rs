// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # anisonet-observability
//!
//! Logging setup shared by the anisonet binaries, with per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: write logs to a timestamped file instead of stdout

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Log targets that accept `--debug-<name>` flags
pub const KNOWN_CRATES: &[&str] = &["anisonet-connectivity", "anisonet-config", "build_network"];
