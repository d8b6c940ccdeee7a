//! Core types for StyleVault.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{CartLine, CartTotals, Coupon, MAX_DISCOUNT_PERCENT};
pub use id::*;
pub use product::{Catalog, Product};
