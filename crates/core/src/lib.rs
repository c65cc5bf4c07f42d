//! HelpNet Core - Shared domain library.
//!
//! This crate provides the domain types and checkout arithmetic used across
//! all HelpNet components:
//! - `api` - JSON REST backend for the marketplace
//! - `cli` - Command-line tools for migrations, seeding, and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere, including tests that never touch a socket.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, postal
//!   codes, and statuses
//! - [`checkout`] - Payment allocation, installment math, and order-draft
//!   arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod types;

pub use checkout::*;
pub use types::*;
