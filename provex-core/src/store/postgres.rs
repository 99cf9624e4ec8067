use async_trait::async_trait;
use provex_model::{Account, Requester};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::traits::AccountStore;

/// Embedded migrations for the provisioning schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Postgres-backed persistence gateway.
///
/// `accounts.email` carries a unique index so a collision that slips
/// past the read-then-decide check fails the insert explicitly instead
/// of corrupting state.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    create_time: i64,
    expire_time: i64,
    user_id: Uuid,
    is_used: i16,
    is_deleted: i16,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            email: row.email,
            password: row.password,
            first_name: row.first_name,
            last_name: row.last_name,
            create_time: row.create_time,
            expire_time: row.expire_time,
            user_id: row.user_id,
            is_used: row.is_used,
            is_deleted: row.is_deleted,
        }
    }
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        // Tombstoned rows count too; emails are unique across all rows.
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, password, first_name, last_name,
                   create_time, expire_time, user_id, is_used, is_deleted
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, email, password, first_name, last_name,
                create_time, expire_time, user_id, is_used, is_deleted
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.create_time)
        .bind(account.expire_time)
        .bind(account.user_id)
        .bind(account.is_used)
        .bind(account.is_deleted)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_requester_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Requester>, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            r#"
            SELECT id, domain, recovery_email
            FROM requesters
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, domain, recovery_email)| Requester {
            id,
            domain,
            recovery_email,
        }))
    }
}
