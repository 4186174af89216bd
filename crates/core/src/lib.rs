//! Rocketshoes Core - Cart domain types.
//!
//! Used by `rocketshoes-cart` (the store, stock client and persistence) and by
//! `rocketshoes-cli`.
//!
//! Nothing in here performs I/O. A [`Cart`] is an immutable value: every
//! change produces a new cart, which is what lets the store hand out
//! snapshots without copying.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, stock entries, line items and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
