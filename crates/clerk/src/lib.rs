//! Natural-language shopkeeper engine for the StyleVault storefront.
//!
//! Turns free-text customer messages into executed store actions and a
//! conversational reply. Command resolution is layered: local intent tables
//! handle the common commands instantly, a remote tool-calling model handles
//! everything else, and a claim enforcer guarantees the reply never asserts
//! a cart change that did not happen.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod config;
pub mod enforcer;
pub mod error;
pub mod intent;
pub mod llm;
pub mod search;
pub mod service;
pub mod tools;

pub use actions::{ActionRecord, ActivityEntry, MemoryCart, StoreActions};
pub use config::ClerkConfig;
pub use error::ClerkError;
pub use service::{ClerkReply, ClerkService, MAX_TOOL_ITERATIONS};
