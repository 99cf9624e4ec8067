use std::collections::HashMap;

use async_trait::async_trait;
use provex_model::{Account, Requester};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::traits::AccountStore;

/// In-memory account store. Backs the test suites and `DEV_MODE` runs
/// that have no database; enforces the same email uniqueness rule as
/// the Postgres schema.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
    requesters: RwLock<HashMap<String, Requester>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a requester under its hashed bearer token.
    pub async fn seed_requester(&self, token_hash: impl Into<String>, requester: Requester) {
        self.requesters
            .write()
            .await
            .insert(token_hash.into(), requester);
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        accounts.insert(account.email.clone(), account.clone());
        Ok(())
    }

    async fn find_requester_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Requester>, StoreError> {
        Ok(self.requesters.read().await.get(token_hash).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn account(email: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password: "pw".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            create_time: 0,
            expire_time: 1,
            user_id: Uuid::new_v4(),
            is_used: 0,
            is_deleted: 0,
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryAccountStore::new();
        store.insert(&account("a@x.dev")).await.unwrap();
        assert!(store.find_by_email("a@x.dev").await.unwrap().is_some());
        assert!(store.find_by_email("b@x.dev").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_insert_with_same_email_is_a_duplicate() {
        let store = MemoryAccountStore::new();
        store.insert(&account("a@x.dev")).await.unwrap();
        assert!(matches!(
            store.insert(&account("a@x.dev")).await,
            Err(StoreError::DuplicateEmail)
        ));
        assert_eq!(store.account_count().await, 1);
    }
}
