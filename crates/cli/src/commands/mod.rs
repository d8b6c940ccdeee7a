//! CLI command implementations.

pub mod catalog;
pub mod chat;
pub mod search;
