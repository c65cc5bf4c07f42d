//! Order history handlers for clients and vendors.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, NaiveDate, Utc};
use helpnet_core::{Money, OrderId, OrderStatus, PaymentKind, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::RepositoryError;
use crate::db::orders::{Order, OrderItem, OrderPayment, VendorFinancials, VendorOrderSummary};
use crate::error::{ApiError, Result};
use crate::middleware::{ClientAuth, VendorAuth};
use crate::state::AppState;

/// Delivery address as frozen on the order.
#[derive(Debug, Serialize)]
pub struct ShippingView {
    pub cep: String,
    pub street: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub subtotal: Money,
    pub freight: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freight_service: Option<String>,
    pub discount: Money,
    pub total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub shipping: ShippingView,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            created_at: order.created_at,
            subtotal: order.subtotal,
            freight: order.freight,
            freight_service: order.freight_service,
            discount: order.discount,
            total: order.total,
            coupon_code: order.coupon_code,
            shipping: ShippingView {
                cep: order.ship_cep.to_string(),
                street: order.ship_street,
                number: order.ship_number,
                complement: order.ship_complement,
                district: order.ship_district,
                city: order.ship_city,
                state: order.ship_state,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub line_total: Money,
}

impl From<OrderItem> for OrderItemView {
    fn from(item: OrderItem) -> Self {
        let line_total = item.unit_price.scale(Decimal::from(item.quantity));
        Self {
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total,
        }
    }
}

/// One payment split with its simulated receipt.
#[derive(Debug, Serialize)]
pub struct OrderPaymentView {
    pub kind: PaymentKind,
    pub label: &'static str,
    pub amount: Money,
    pub installments: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boleto_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boleto_due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_authorization: Option<String>,
}

impl From<OrderPayment> for OrderPaymentView {
    fn from(payment: OrderPayment) -> Self {
        Self {
            kind: payment.kind,
            label: payment.kind.label(),
            amount: payment.amount,
            installments: payment.installments,
            pix_code: payment.pix_code,
            boleto_line: payment.boleto_line,
            boleto_due_date: payment.boleto_due_date,
            card_authorization: payment.card_authorization,
        }
    }
}

/// Order header plus its lines and payment splits.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderView,
    pub items: Vec<OrderItemView>,
    pub payments: Vec<OrderPaymentView>,
}

/// Fetch lines and payments for an already-authorized order header.
pub(super) async fn load_detail(state: &AppState, order: Order) -> Result<OrderDetail> {
    let items = state.orders().items(order.id).await?;
    let payments = state.orders().payments(order.id).await?;
    Ok(OrderDetail {
        order: order.into(),
        items: items.into_iter().map(OrderItemView::from).collect(),
        payments: payments.into_iter().map(OrderPaymentView::from).collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct VendorOrderView {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items_count: i64,
    pub vendor_total: Money,
}

impl From<VendorOrderSummary> for VendorOrderView {
    fn from(summary: VendorOrderSummary) -> Self {
        Self {
            order_id: summary.order_id,
            status: summary.status,
            created_at: summary.created_at,
            items_count: summary.items_count,
            vendor_total: summary.vendor_total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FinancialsView {
    pub orders_count: i64,
    pub items_sold: i64,
    pub gross_revenue: Money,
}

impl From<VendorFinancials> for FinancialsView {
    fn from(financials: VendorFinancials) -> Self {
        Self {
            orders_count: financials.orders_count,
            items_sold: financials.items_sold,
            gross_revenue: financials.gross_revenue,
        }
    }
}

/// GET /api/orders
pub async fn index(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state.orders().list_for_client(client_id).await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// GET /api/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = state.orders().find_for_client(id, client_id).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound("Pedido"),
        other => other.into(),
    })?;
    Ok(Json(load_detail(&state, order).await?))
}

/// GET /api/vendors/me/orders
pub async fn vendor_index(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
) -> Result<Json<Vec<VendorOrderView>>> {
    let summaries = state.orders().list_for_vendor(vendor_id).await?;
    Ok(Json(summaries.into_iter().map(VendorOrderView::from).collect()))
}

/// GET /api/vendors/me/financials
pub async fn vendor_financials(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
) -> Result<Json<FinancialsView>> {
    let financials = state.orders().financials(vendor_id).await?;
    Ok(Json(financials.into()))
}
