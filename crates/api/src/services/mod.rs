//! Application services: auth, checkout sessions, notifications, and the
//! external lookup clients.

pub mod auth;
pub mod cep;
pub mod checkout;
pub mod freight;
pub mod notifications;
pub mod receipts;

pub use auth::AuthService;
pub use cep::CepClient;
pub use checkout::CheckoutService;
pub use freight::FreightClient;
pub use notifications::NotificationHub;
