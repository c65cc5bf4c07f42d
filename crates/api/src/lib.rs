//! HelpNet API library.
//!
//! The API internals as a library, so integration tests can drive the
//! services, repositories, and route handlers directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
