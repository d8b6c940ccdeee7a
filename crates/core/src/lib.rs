//! StyleVault Core - Shared domain types.
//!
//! This crate provides common types used across all StyleVault components:
//! - `clerk` - Natural-language command resolution engine
//! - `cli` - Command-line chat and catalog tools
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Products, catalog index, cart lines, and coupons

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
