//! # Address Repository
//!
//! Shipping addresses. Settlement only reads them, inside its transaction,
//! to check that the buyer owns the address they ship to.

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Address, AddressId, NewAddress, UserId};

const ADDRESS_COLUMNS: &str =
    "id, user_id, label, recipient_name, phone, detail, created_at, updated_at";

async fn fetch_address<'e>(executor: impl SqliteExecutor<'e>, id: AddressId) -> DbResult<Option<Address>> {
    let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?1");
    let address = sqlx::query_as::<_, Address>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(address)
}

/// Repository for shipping addresses.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
}

impl AddressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AddressRepository { pool }
    }

    pub async fn insert(&self, address: &NewAddress) -> DbResult<Address> {
        debug!(user_id = %address.user_id, "Inserting address");

        let sql = format!(
            "INSERT INTO addresses (user_id, label, recipient_name, phone, detail, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING {ADDRESS_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Address>(&sql)
            .bind(address.user_id)
            .bind(&address.label)
            .bind(&address.recipient_name)
            .bind(&address.phone)
            .bind(&address.detail)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(inserted)
    }

    pub async fn find_by_id(&self, id: AddressId) -> DbResult<Option<Address>> {
        fetch_address(&self.pool, id).await
    }

    /// A user's addresses, oldest first.
    pub async fn list_for_user(&self, user_id: UserId) -> DbResult<Vec<Address>> {
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = ?1 ORDER BY id");
        let addresses = sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(addresses)
    }

    /// Same as [`find_by_id`](Self::find_by_id), on a transaction's connection.
    pub async fn find_in(conn: &mut SqliteConnection, id: AddressId) -> DbResult<Option<Address>> {
        fetch_address(conn, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn home(user_id: UserId) -> NewAddress {
        NewAddress {
            user_id,
            label: "Home".to_string(),
            recipient_name: "Sari".to_string(),
            phone: "0812000000".to_string(),
            detail: "Jl. Merdeka 1, Bandung".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_find_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.addresses();

        let a = repo.insert(&home(1)).await.unwrap();
        let b = repo.insert(&home(1)).await.unwrap();
        repo.insert(&home(2)).await.unwrap();

        let found = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(found, a);
        assert!(found.is_owned_by(1));
        assert!(!found.is_owned_by(2));

        let mine = repo.list_for_user(1).await.unwrap();
        assert_eq!(mine.iter().map(|x| x.id).collect::<Vec<_>>(), vec![a.id, b.id]);

        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }
}
