//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::products::CatalogPage;
use crate::db::{
    AddressRepository, AdminUserRepository, CategoryRepository, ClientRepository,
    CouponRepository, OrderRepository, ProductRepository, VendorRepository,
};
use crate::services::auth::{AuthService, TokenService};
use crate::services::{CepClient, CheckoutService, FreightClient, NotificationHub};

const CATALOG_CACHE_CAPACITY: u64 = 1000;
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    categories: CategoryRepository,
    clients: ClientRepository,
    vendors: VendorRepository,
    admins: AdminUserRepository,
    products: ProductRepository,
    addresses: AddressRepository,
    coupons: CouponRepository,
    orders: OrderRepository,
    tokens: TokenService,
    auth: AuthService,
    cep: CepClient,
    notifications: NotificationHub,
    checkout: CheckoutService,
    /// Public catalog pages keyed by filter, 5 minute TTL, flushed on any
    /// product write
    catalog_cache: Cache<String, Arc<CatalogPage>>,
}

/// Cheap-to-clone handle to everything handlers need.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let categories = CategoryRepository::new(pool.clone());
        let clients = ClientRepository::new(pool.clone());
        let vendors = VendorRepository::new(pool.clone());
        let admins = AdminUserRepository::new(pool.clone());
        let products = ProductRepository::new(pool.clone());
        let addresses = AddressRepository::new(pool.clone());
        let coupons = CouponRepository::new(pool.clone());
        let orders = OrderRepository::new(pool.clone());

        let tokens = TokenService::new(&config.jwt_secret);
        let auth = AuthService::new(
            clients.clone(),
            vendors.clone(),
            admins.clone(),
            tokens.clone(),
        );

        let cep = CepClient::new(&config.cep_base_url);
        let freight = FreightClient::new(&config.freight_base_url);
        let checkout = CheckoutService::new(freight);
        let notifications = NotificationHub::new();

        let catalog_cache = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                categories,
                clients,
                vendors,
                admins,
                products,
                addresses,
                coupons,
                orders,
                tokens,
                auth,
                cep,
                notifications,
                checkout,
                catalog_cache,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryRepository {
        &self.inner.categories
    }

    #[must_use]
    pub fn clients(&self) -> &ClientRepository {
        &self.inner.clients
    }

    #[must_use]
    pub fn vendors(&self) -> &VendorRepository {
        &self.inner.vendors
    }

    #[must_use]
    pub fn admins(&self) -> &AdminUserRepository {
        &self.inner.admins
    }

    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    #[must_use]
    pub fn addresses(&self) -> &AddressRepository {
        &self.inner.addresses
    }

    #[must_use]
    pub fn coupons(&self) -> &CouponRepository {
        &self.inner.coupons
    }

    #[must_use]
    pub fn orders(&self) -> &OrderRepository {
        &self.inner.orders
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn cep(&self) -> &CepClient {
        &self.inner.cep
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationHub {
        &self.inner.notifications
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<String, Arc<CatalogPage>> {
        &self.inner.catalog_cache
    }
}
