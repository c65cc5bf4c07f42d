//! Seed the database with demo data for local development.
//!
//! Creates a demo vendor and client (both with password `senha123`), a set
//! of categories and products, a welcome coupon and a delivery address.
//! Safe to run repeatedly: rows are keyed on their natural identifiers and
//! existing data is updated, not duplicated.

use helpnet_core::Money;
use sqlx::PgPool;
use tracing::info;

use super::{CommandError, admin::hash_password, connect};

const DEMO_PASSWORD: &str = "senha123";
const VENDOR_EMAIL: &str = "loja@helpnet.app.br";
const CLIENT_EMAIL: &str = "cliente@helpnet.app.br";

const CATEGORIES: [(&str, &str); 5] = [
    ("Eletrônicos", "eletronicos"),
    ("Moda", "moda"),
    ("Casa e Decoração", "casa-e-decoracao"),
    ("Esporte e Lazer", "esporte-e-lazer"),
    ("Livros", "livros"),
];

/// (name, description, price in centavos, stock, category slug)
const PRODUCTS: [(&str, &str, i64, i32, &str); 6] = [
    (
        "Fone de Ouvido Bluetooth",
        "Fone sem fio com cancelamento de ruído e até 30h de bateria.",
        14990,
        40,
        "eletronicos",
    ),
    (
        "Teclado Mecânico RGB",
        "Teclado mecânico ABNT2 com switches táteis e iluminação RGB.",
        34990,
        25,
        "eletronicos",
    ),
    (
        "Mouse Gamer 16000 DPI",
        "Mouse óptico com 8 botões programáveis e sensor de 16000 DPI.",
        12990,
        60,
        "eletronicos",
    ),
    (
        "Camiseta Básica de Algodão",
        "Camiseta 100% algodão, corte unissex, disponível em várias cores.",
        4990,
        120,
        "moda",
    ),
    (
        "Tênis de Corrida Leve",
        "Tênis com entressola de espuma e cabedal em mesh respirável.",
        29990,
        35,
        "esporte-e-lazer",
    ),
    (
        "Luminária de Mesa Articulada",
        "Luminária LED com braço articulado e três níveis de intensidade.",
        8990,
        50,
        "casa-e-decoracao",
    ),
];

/// Populate the database with the demo catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a statement fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let password_hash = hash_password(DEMO_PASSWORD)?;

    let categories = seed_categories(&pool).await?;
    let vendor_id = seed_vendor(&pool, &password_hash).await?;
    let client_id = seed_client(&pool, &password_hash).await?;
    let products = seed_products(&pool, vendor_id, &categories).await?;
    seed_coupon(&pool, vendor_id).await?;
    seed_address(&pool, client_id).await?;

    info!("Seeding complete!");
    info!("  Categories: {}", categories.len());
    info!("  Products: {products}");
    info!("  Vendor login: {VENDOR_EMAIL} / {DEMO_PASSWORD}");
    info!("  Client login: {CLIENT_EMAIL} / {DEMO_PASSWORD}");
    info!("  Coupon: BEMVINDO10 (10% off)");
    Ok(())
}

/// Upsert the demo categories, returning `(slug, id)` pairs.
async fn seed_categories(pool: &PgPool) -> Result<Vec<(&'static str, i32)>, CommandError> {
    let mut ids = Vec::with_capacity(CATEGORIES.len());
    for (name, slug) in CATEGORIES {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO categories (name, slug) VALUES ($1, $2)
             ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(name)
        .bind(slug)
        .fetch_one(pool)
        .await?;
        ids.push((slug, id));
    }
    info!(count = ids.len(), "Categories seeded");
    Ok(ids)
}

async fn seed_vendor(pool: &PgPool, password_hash: &str) -> Result<i32, CommandError> {
    // The no-op DO UPDATE makes RETURNING yield the row on conflict too;
    // an existing vendor keeps its password.
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO vendors (email, password_hash, store_name, cnpj)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
         RETURNING id",
    )
    .bind(VENDOR_EMAIL)
    .bind(password_hash)
    .bind("TechBrasil")
    .bind("12.345.678/0001-90")
    .fetch_one(pool)
    .await?;
    info!(vendor_id = id, "Vendor seeded");
    Ok(id)
}

async fn seed_client(pool: &PgPool, password_hash: &str) -> Result<i32, CommandError> {
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO clients (email, password_hash, name, cpf)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
         RETURNING id",
    )
    .bind(CLIENT_EMAIL)
    .bind(password_hash)
    .bind("Maria Silva")
    .bind("123.456.789-09")
    .fetch_one(pool)
    .await?;
    info!(client_id = id, "Client seeded");
    Ok(id)
}

/// Upsert the demo products, keyed on `(vendor_id, name)`.
///
/// Returns how many products were written.
async fn seed_products(
    pool: &PgPool,
    vendor_id: i32,
    categories: &[(&'static str, i32)],
) -> Result<usize, CommandError> {
    let mut seeded = 0;
    for (name, description, centavos, stock, slug) in PRODUCTS {
        let Some(&(_, category_id)) = categories.iter().find(|(s, _)| *s == slug) else {
            continue;
        };
        let price = Money::from_centavos(centavos);

        let existing = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM products WHERE vendor_id = $1 AND name = $2",
        )
        .bind(vendor_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        if let Some(id) = existing {
            sqlx::query(
                "UPDATE products
                 SET category_id = $2, description = $3, price = $4, stock = $5,
                     active = TRUE, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(id)
            .bind(category_id)
            .bind(description)
            .bind(price)
            .bind(stock)
            .execute(pool)
            .await?;
        } else {
            sqlx::query(
                "INSERT INTO products
                     (vendor_id, category_id, name, description, price, stock, images)
                 VALUES ($1, $2, $3, $4, $5, $6, '{}')",
            )
            .bind(vendor_id)
            .bind(category_id)
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(stock)
            .execute(pool)
            .await?;
        }
        seeded += 1;
    }
    info!(count = seeded, "Products seeded");
    Ok(seeded)
}

async fn seed_coupon(pool: &PgPool, vendor_id: i32) -> Result<(), CommandError> {
    sqlx::query(
        "INSERT INTO coupons (vendor_id, code, discount_percent, active)
         VALUES ($1, 'BEMVINDO10', 10, TRUE)
         ON CONFLICT (code) DO UPDATE SET active = TRUE",
    )
    .bind(vendor_id)
    .execute(pool)
    .await?;
    info!("Coupon seeded");
    Ok(())
}

async fn seed_address(pool: &PgPool, client_id: i32) -> Result<(), CommandError> {
    let existing = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM addresses WHERE client_id = $1 AND label = $2",
    )
    .bind(client_id)
    .bind("Casa")
    .fetch_optional(pool)
    .await?;

    if existing.is_none() {
        sqlx::query(
            "INSERT INTO addresses
                 (client_id, label, cep, street, number, complement, district, city, state,
                  is_default)
             VALUES ($1, 'Casa', '01310100', 'Avenida Paulista', '1578', NULL,
                     'Bela Vista', 'São Paulo', 'SP',
                     NOT EXISTS (SELECT 1 FROM addresses WHERE client_id = $1 AND is_default))",
        )
        .bind(client_id)
        .execute(pool)
        .await?;
    }
    info!("Address seeded");
    Ok(())
}
