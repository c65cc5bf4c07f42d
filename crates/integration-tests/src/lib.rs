//! Integration tests for HelpNet.
//!
//! The tests under `tests/` drive the API crate's in-process services
//! (checkout sessions, payment plans, notifications, receipts) the same
//! way the HTTP handlers do, without a database or a running server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p helpnet-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full cart-to-submission walks through the checkout service
//! - `checkout_payments` - Payment split, installment, and receipt behavior
//! - `notifications` - Per-recipient notification lifecycle
