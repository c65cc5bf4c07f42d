//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /api/auth/clients/register  - Client signup
//! POST /api/auth/clients/login     - Client login
//! POST /api/auth/vendors/register  - Vendor signup
//! POST /api/auth/vendors/login     - Vendor login
//! POST /api/auth/admin/login       - Admin login
//!
//! # Catalog
//! GET    /api/products             - Paged catalog with filters (public)
//! GET    /api/products/{id}        - Product detail (public)
//! GET    /api/products/mine        - Vendor's own products
//! POST   /api/products             - Create product (vendor)
//! PUT    /api/products/{id}        - Update product (vendor)
//! DELETE /api/products/{id}        - Delete product (vendor)
//!
//! # Categories (writes require admin)
//! GET    /api/categories           - Category list (public)
//! POST   /api/categories           - Create category
//! PUT    /api/categories/{id}      - Update category
//! DELETE /api/categories/{id}      - Delete category
//!
//! # CEP
//! GET    /api/cep/{cep}            - ViaCEP passthrough (best effort)
//!
//! # Addresses (client)
//! GET    /api/addresses            - Address book
//! POST   /api/addresses            - Create address
//! PUT    /api/addresses/{id}       - Update address
//! DELETE /api/addresses/{id}       - Delete address
//! PUT    /api/addresses/{id}/default - Mark as default
//!
//! # Coupons (vendor; validate is client)
//! GET    /api/coupons              - Vendor's coupons
//! POST   /api/coupons              - Create coupon
//! PUT    /api/coupons/{id}         - Update coupon
//! DELETE /api/coupons/{id}         - Delete coupon
//! GET    /api/coupons/validate/{code} - Dry validity check
//!
//! # Checkout session (client)
//! GET    /api/checkout             - Session snapshot
//! PUT    /api/checkout/items       - Replace cart items
//! PUT    /api/checkout/address     - Select address, quote freight
//! PUT    /api/checkout/coupon      - Apply or clear coupon
//! POST   /api/checkout/methods     - Add payment method
//! PUT    /api/checkout/methods/{id} - Set allocation amount
//! DELETE /api/checkout/methods/{id} - Remove payment method
//! POST   /api/checkout/distribute  - Spread unallocated remainder
//! POST   /api/checkout/methods/{id}/cash-discount - Apply cash discount
//! GET    /api/checkout/installments - Installment table for an amount
//! POST   /api/checkout/submit      - Write the order
//! DELETE /api/checkout             - Abandon session
//!
//! # Orders
//! GET    /api/orders               - Client order history
//! GET    /api/orders/{id}          - Order detail with receipts
//! GET    /api/vendors/me/orders    - Vendor sales
//! GET    /api/vendors/me/financials - Vendor aggregates
//!
//! # Uploads (vendor)
//! POST   /api/uploads              - Store product images
//! DELETE /api/uploads/{filename}   - Remove a stored image
//!
//! # Notifications (any account)
//! GET    /api/notifications        - Active notifications
//! DELETE /api/notifications/{id}   - Dismiss one
//! DELETE /api/notifications        - Dismiss all
//! ```

pub mod addresses;
pub mod auth;
pub mod categories;
pub mod cep;
pub mod checkout;
pub mod coupons;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Several images per request, so the cap is generous.
const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/clients/register", post(auth::register_client))
        .route("/clients/login", post(auth::login_client))
        .route("/vendors/register", post(auth::register_vendor))
        .route("/vendors/login", post(auth::login_vendor))
        .route("/admin/login", post(auth::login_admin))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/mine", get(products::vendor_index))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            put(categories::update).delete(categories::destroy),
        )
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route(
            "/{id}",
            put(addresses::update).delete(addresses::destroy),
        )
        .route("/{id}/default", put(addresses::set_default))
}

/// Create the coupon routes router.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(coupons::index).post(coupons::create))
        .route("/{id}", put(coupons::update).delete(coupons::destroy))
        .route("/validate/{code}", get(coupons::validate))
}

/// Create the checkout session routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).delete(checkout::abandon))
        .route("/items", put(checkout::set_items))
        .route("/address", put(checkout::set_address))
        .route("/coupon", put(checkout::set_coupon))
        .route("/methods", post(checkout::add_method))
        .route(
            "/methods/{id}",
            put(checkout::update_method).delete(checkout::remove_method),
        )
        .route("/methods/{id}/cash-discount", post(checkout::cash_discount))
        .route("/distribute", post(checkout::distribute))
        .route("/installments", get(checkout::installments))
        .route("/submit", post(checkout::submit))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create the vendor self-service routes router.
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/me/orders", get(orders::vendor_index))
        .route("/me/financials", get(orders::vendor_financials))
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(uploads::create))
        .route("/{filename}", delete(uploads::destroy))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notifications::index).delete(notifications::clear),
        )
        .route("/{id}", delete(notifications::dismiss))
}

/// Create all routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .nest("/auth", auth_routes())
        // Catalog
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        // CEP lookup
        .route("/cep/{cep}", get(cep::show))
        // Client address book
        .nest("/addresses", address_routes())
        // Vendor coupons + client validity check
        .nest("/coupons", coupon_routes())
        // Checkout session
        .nest("/checkout", checkout_routes())
        // Order history
        .nest("/orders", order_routes())
        .nest("/vendors", vendor_routes())
        // Product images
        .nest("/uploads", upload_routes())
        // Transient notifications
        .nest("/notifications", notification_routes())
}
