//! Database consistency checks.
//!
//! Prints row counts for every table and flags data that usually means a
//! bug somewhere: orders whose payments do not add up to the order total,
//! active products without images, and coupons still marked active after
//! expiring or running out of uses.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};

use super::{CommandError, connect};

const TABLES: [&str; 10] = [
    "clients",
    "vendors",
    "admin_users",
    "categories",
    "products",
    "addresses",
    "coupons",
    "orders",
    "order_items",
    "order_payments",
];

/// Run all checks and print a report.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a query fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    info!("Row counts");
    for table in TABLES {
        // Table names come from the constant above, never from input.
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await?;
        info!("  {table}: {count}");
    }

    let mut findings = 0;
    findings += check_payment_totals(&pool).await?;
    findings += check_products_without_images(&pool).await?;
    findings += check_stale_coupons(&pool).await?;

    if findings == 0 {
        info!("All checks passed");
    } else {
        warn!("{findings} finding(s), see above");
    }
    Ok(())
}

/// Orders where the recorded payments drift from the order total by more
/// than a centavo.
async fn check_payment_totals(pool: &PgPool) -> Result<usize, CommandError> {
    let drifted = sqlx::query_as::<_, (i32, Decimal, Decimal)>(
        "SELECT o.id, o.total, COALESCE(SUM(p.amount), 0) AS paid
         FROM orders o
         LEFT JOIN order_payments p ON p.order_id = o.id
         GROUP BY o.id, o.total
         HAVING ABS(o.total - COALESCE(SUM(p.amount), 0)) > 0.01
         ORDER BY o.id",
    )
    .fetch_all(pool)
    .await?;

    for (id, total, paid) in &drifted {
        warn!("Order {id}: total {total} but payments sum to {paid}");
    }
    Ok(drifted.len())
}

async fn check_products_without_images(pool: &PgPool) -> Result<usize, CommandError> {
    let bare = sqlx::query_as::<_, (i32, String)>(
        "SELECT id, name FROM products
         WHERE active AND cardinality(images) = 0
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    for (id, name) in &bare {
        warn!("Product {id} ({name}) is active but has no images");
    }
    Ok(bare.len())
}

/// Coupons still flagged active although they can no longer be redeemed.
async fn check_stale_coupons(pool: &PgPool) -> Result<usize, CommandError> {
    let stale = sqlx::query_as::<_, (i32, String)>(
        "SELECT id, code FROM coupons
         WHERE active
           AND ((expires_at IS NOT NULL AND expires_at < NOW())
                OR (max_uses IS NOT NULL AND used_count >= max_uses))
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    for (id, code) in &stale {
        warn!("Coupon {id} ({code}) is active but expired or used up");
    }
    Ok(stale.len())
}
