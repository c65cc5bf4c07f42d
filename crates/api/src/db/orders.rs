//! Order repository.
//!
//! Submission writes the order header, its items, its payment splits, the
//! stock decrements, and the coupon use count in one transaction. Items and
//! payments snapshot everything receipts need, so later product edits never
//! rewrite history.

use chrono::{DateTime, NaiveDate, Utc};
use helpnet_core::{
    Cep, ClientId, CouponId, Money, OrderId, OrderItemId, OrderPaymentId, OrderStatus,
    PaymentKind, ProductId, VendorId,
};
use sqlx::PgPool;

use super::{RepositoryError, RepositoryResult};

/// An order header with its delivery address snapshot.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub client_id: ClientId,
    pub ship_cep: Cep,
    pub ship_street: String,
    pub ship_number: String,
    pub ship_complement: Option<String>,
    pub ship_district: String,
    pub ship_city: String,
    pub ship_state: String,
    pub subtotal: Money,
    pub freight: Money,
    pub freight_service: Option<String>,
    pub discount: Money,
    pub total: Money,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One purchased line, with product name and price frozen at purchase time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub vendor_id: VendorId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
}

/// One payment split with its simulated receipt data.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderPayment {
    pub id: OrderPaymentId,
    pub order_id: OrderId,
    pub kind: PaymentKind,
    pub amount: Money,
    pub installments: i32,
    pub pix_code: Option<String>,
    pub boleto_line: Option<String>,
    pub boleto_due_date: Option<NaiveDate>,
    pub card_authorization: Option<String>,
}

/// Order header data for insertion.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: ClientId,
    pub ship_cep: Cep,
    pub ship_street: String,
    pub ship_number: String,
    pub ship_complement: Option<String>,
    pub ship_district: String,
    pub ship_city: String,
    pub ship_state: String,
    pub subtotal: Money,
    pub freight: Money,
    pub freight_service: Option<String>,
    pub discount: Money,
    pub total: Money,
    pub coupon_code: Option<String>,
}

/// Order line data for insertion.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub vendor_id: VendorId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
}

/// Payment split data for insertion, receipt already generated.
#[derive(Debug, Clone)]
pub struct NewOrderPayment {
    pub kind: PaymentKind,
    pub amount: Money,
    pub installments: i32,
    pub pix_code: Option<String>,
    pub boleto_line: Option<String>,
    pub boleto_due_date: Option<NaiveDate>,
    pub card_authorization: Option<String>,
}

/// One order seen from a vendor's side: only that vendor's lines are summed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VendorOrderSummary {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items_count: i64,
    pub vendor_total: Money,
}

/// Aggregate sales figures for a vendor.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VendorFinancials {
    pub orders_count: i64,
    pub items_sold: i64,
    pub gross_revenue: Money,
}

const ORDER_COLUMNS: &str = "id, client_id, ship_cep, ship_street, ship_number, ship_complement, \
                             ship_district, ship_city, ship_state, subtotal, freight, \
                             freight_service, discount, total, coupon_code, status, created_at";

/// Repository for order operations.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write a complete order atomically.
    ///
    /// Decrements stock for every line and bumps the coupon use count. Any
    /// line whose product lacks stock aborts the whole transaction with
    /// [`RepositoryError::Conflict`].
    pub async fn submit(
        &self,
        new: &NewOrder,
        items: &[NewOrderItem],
        payments: &[NewOrderPayment],
        coupon_id: Option<CouponId>,
    ) -> RepositoryResult<Order> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders
                 (client_id, ship_cep, ship_street, ship_number, ship_complement,
                  ship_district, ship_city, ship_state, subtotal, freight, freight_service,
                  discount, total, coupon_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {ORDER_COLUMNS}",
        ))
        .bind(new.client_id)
        .bind(&new.ship_cep)
        .bind(&new.ship_street)
        .bind(&new.ship_number)
        .bind(new.ship_complement.as_deref())
        .bind(&new.ship_district)
        .bind(&new.ship_city)
        .bind(&new.ship_state)
        .bind(new.subtotal)
        .bind(new.freight)
        .bind(new.freight_service.as_deref())
        .bind(new.discount)
        .bind(new.total)
        .bind(new.coupon_code.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            // Guarded decrement: zero rows means not enough stock
            let result = sqlx::query(
                "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "Estoque insuficiente para {}",
                    item.product_name
                )));
            }

            sqlx::query(
                "INSERT INTO order_items
                     (order_id, product_id, vendor_id, product_name, quantity, unit_price)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.vendor_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        for payment in payments {
            sqlx::query(
                "INSERT INTO order_payments
                     (order_id, kind, amount, installments, pix_code, boleto_line,
                      boleto_due_date, card_authorization)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(order.id)
            .bind(payment.kind)
            .bind(payment.amount)
            .bind(payment.installments)
            .bind(payment.pix_code.as_deref())
            .bind(payment.boleto_line.as_deref())
            .bind(payment.boleto_due_date)
            .bind(payment.card_authorization.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        if let Some(coupon_id) = coupon_id {
            sqlx::query("UPDATE coupons SET used_count = used_count + 1 WHERE id = $1")
                .bind(coupon_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    /// List a client's orders, newest first.
    pub async fn list_for_client(&self, client_id: ClientId) -> RepositoryResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE client_id = $1 ORDER BY created_at DESC",
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Find one order owned by a client.
    pub async fn find_for_client(
        &self,
        id: OrderId,
        client_id: ClientId,
    ) -> RepositoryResult<Order> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND client_id = $2",
        ))
        .bind(id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Items of one order.
    pub async fn items(&self, order_id: OrderId) -> RepositoryResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, vendor_id, product_name, quantity, unit_price
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Payment splits of one order.
    pub async fn payments(&self, order_id: OrderId) -> RepositoryResult<Vec<OrderPayment>> {
        let payments = sqlx::query_as::<_, OrderPayment>(
            "SELECT id, order_id, kind, amount, installments, pix_code, boleto_line,
                    boleto_due_date, card_authorization
             FROM order_payments WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    /// Orders containing at least one of the vendor's products, with that
    /// vendor's share of each order.
    pub async fn list_for_vendor(
        &self,
        vendor_id: VendorId,
    ) -> RepositoryResult<Vec<VendorOrderSummary>> {
        let summaries = sqlx::query_as::<_, VendorOrderSummary>(
            "SELECT o.id AS order_id, o.status, o.created_at,
                    COUNT(i.id) AS items_count,
                    SUM(i.unit_price * i.quantity) AS vendor_total
             FROM orders o
             JOIN order_items i ON i.order_id = o.id
             WHERE i.vendor_id = $1
             GROUP BY o.id, o.status, o.created_at
             ORDER BY o.created_at DESC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    /// Aggregate sales figures for a vendor, cancelled orders excluded.
    pub async fn financials(&self, vendor_id: VendorId) -> RepositoryResult<VendorFinancials> {
        let financials = sqlx::query_as::<_, VendorFinancials>(
            "SELECT COUNT(DISTINCT i.order_id) AS orders_count,
                    COALESCE(SUM(i.quantity), 0) AS items_sold,
                    COALESCE(SUM(i.unit_price * i.quantity), 0) AS gross_revenue
             FROM order_items i
             JOIN orders o ON o.id = i.order_id
             WHERE i.vendor_id = $1 AND o.status <> 'cancelled'",
        )
        .bind(vendor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(financials)
    }
}
