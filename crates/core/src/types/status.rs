//! Status and kind enums for domain entities.

use serde::{Deserialize, Serialize};

/// Payment instrument kinds accepted at checkout.
///
/// Serialized lowercase (`pix`, `cartao`, `debito`, `boleto`) both in JSON
/// and in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Pix,
    Cartao,
    Debito,
    Boleto,
}

impl PaymentKind {
    /// Human-readable label shown on receipts and summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::Cartao => "Cartão de crédito",
            Self::Debito => "Cartão de débito",
            Self::Boleto => "Boleto bancário",
        }
    }

    /// Credit card is the only kind paid in installments.
    #[must_use]
    pub const fn supports_installments(self) -> bool {
        matches!(self, Self::Cartao)
    }
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pix => write!(f, "pix"),
            Self::Cartao => write!(f, "cartao"),
            Self::Debito => write!(f, "debito"),
            Self::Boleto => write!(f, "boleto"),
        }
    }
}

impl std::str::FromStr for PaymentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pix" => Ok(Self::Pix),
            "cartao" => Ok(Self::Cartao),
            "debito" => Ok(Self::Debito),
            "boleto" => Ok(Self::Boleto),
            _ => Err(format!("invalid payment kind: {s}")),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Submitted, awaiting payment confirmation.
    #[default]
    AwaitingPayment,
    /// Payment confirmed (simulated).
    Paid,
    /// Handed to the carrier.
    Shipped,
    /// Delivered to the client.
    Delivered,
    /// Cancelled before shipment.
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingPayment => write!(f, "awaiting_payment"),
            Self::Paid => write!(f, "paid"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_payment" => Ok(Self::AwaitingPayment),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Severity of a transient user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin-user management.
    SuperAdmin,
    /// Full access to catalog and order management.
    Admin,
    /// Read-only access.
    Viewer,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_kind_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentKind::Cartao).unwrap(),
            "\"cartao\""
        );
        let kind: PaymentKind = serde_json::from_str("\"boleto\"").unwrap();
        assert_eq!(kind, PaymentKind::Boleto);
    }

    #[test]
    fn test_payment_kind_from_str_roundtrip() {
        for kind in [
            PaymentKind::Pix,
            PaymentKind::Cartao,
            PaymentKind::Debito,
            PaymentKind::Boleto,
        ] {
            let parsed: PaymentKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("dinheiro".parse::<PaymentKind>().is_err());
    }

    #[test]
    fn test_only_cartao_supports_installments() {
        assert!(PaymentKind::Cartao.supports_installments());
        assert!(!PaymentKind::Pix.supports_installments());
        assert!(!PaymentKind::Debito.supports_installments());
        assert!(!PaymentKind::Boleto.supports_installments());
    }

    #[test]
    fn test_order_status_from_str_roundtrip() {
        for status in [
            OrderStatus::AwaitingPayment,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_admin_role_from_str() {
        assert_eq!(
            "super_admin".parse::<AdminRole>().unwrap(),
            AdminRole::SuperAdmin
        );
        assert!("root".parse::<AdminRole>().is_err());
    }
}
