//! Core types for HelpNet.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cep;
pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use cep::{Cep, CepError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use status::*;
