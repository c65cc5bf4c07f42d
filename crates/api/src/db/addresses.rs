//! Client address book repository.

use helpnet_core::{AddressId, Cep, ClientId};
use sqlx::PgPool;

use super::{RepositoryError, RepositoryResult};

/// A delivery address owned by a client.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub client_id: ClientId,
    /// Nickname shown in the address picker ("Casa", "Trabalho")
    pub label: String,
    pub cep: Cep,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    pub is_default: bool,
}

/// New address data for insertion or update.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub label: String,
    pub cep: Cep,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
}

const ADDRESS_COLUMNS: &str = "id, client_id, label, cep, street, number, complement, district, \
                               city, state, is_default";

/// Repository for address operations. Every method is scoped to the owning
/// client so one client can never touch another's rows.
#[derive(Clone)]
pub struct AddressRepository {
    pool: PgPool,
}

impl AddressRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a client's addresses, default first.
    pub async fn list_for_client(&self, client_id: ClientId) -> RepositoryResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses
             WHERE client_id = $1 ORDER BY is_default DESC, id",
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(addresses)
    }

    /// Find one address owned by a client.
    pub async fn find_for_client(
        &self,
        id: AddressId,
        client_id: ClientId,
    ) -> RepositoryResult<Address> {
        sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1 AND client_id = $2",
        ))
        .bind(id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create an address. The client's first address becomes the default.
    pub async fn create(&self, client_id: ClientId, new: &NewAddress) -> RepositoryResult<Address> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO addresses
                 (client_id, label, cep, street, number, complement, district, city, state,
                  is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                     NOT EXISTS (SELECT 1 FROM addresses WHERE client_id = $1))
             RETURNING {ADDRESS_COLUMNS}",
        ))
        .bind(client_id)
        .bind(&new.label)
        .bind(&new.cep)
        .bind(&new.street)
        .bind(&new.number)
        .bind(new.complement.as_deref())
        .bind(&new.district)
        .bind(&new.city)
        .bind(&new.state)
        .fetch_one(&self.pool)
        .await?;
        Ok(address)
    }

    /// Update an address owned by a client.
    pub async fn update(
        &self,
        id: AddressId,
        client_id: ClientId,
        new: &NewAddress,
    ) -> RepositoryResult<Address> {
        sqlx::query_as::<_, Address>(&format!(
            "UPDATE addresses
             SET label = $3, cep = $4, street = $5, number = $6, complement = $7,
                 district = $8, city = $9, state = $10
             WHERE id = $1 AND client_id = $2
             RETURNING {ADDRESS_COLUMNS}",
        ))
        .bind(id)
        .bind(client_id)
        .bind(&new.label)
        .bind(&new.cep)
        .bind(&new.street)
        .bind(&new.number)
        .bind(new.complement.as_deref())
        .bind(&new.district)
        .bind(&new.city)
        .bind(&new.state)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an address owned by a client.
    pub async fn delete(&self, id: AddressId, client_id: ClientId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark one address as the client's default, clearing the previous one.
    pub async fn set_default(&self, id: AddressId, client_id: ClientId) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE addresses SET is_default = FALSE WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        let result =
            sqlx::query("UPDATE addresses SET is_default = TRUE WHERE id = $1 AND client_id = $2")
                .bind(id)
                .bind(client_id)
                .execute(&mut *tx)
                .await?;
        if result.rows_affected() == 0 {
            // Rolls back the clearing update on drop
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
