use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A provisioned upstream account as stored by the persistence gateway.
///
/// Accounts are never hard-deleted; `is_deleted` is a tombstone and
/// `is_used` marks hand-out state. Both are mutated by collaborators
/// outside the provisioning pipeline, which only ever creates rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Globally unique across all rows, deleted or not.
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Unix seconds.
    pub create_time: i64,
    /// Unix seconds, `create_time` plus the configured TTL.
    pub expire_time: i64,
    /// Owner of the account: the requester it was provisioned for.
    pub user_id: Uuid,
    pub is_used: i16,
    pub is_deleted: i16,
}

impl Account {
    /// The wire representation handed to clients. The password stays
    /// out of API payloads.
    pub fn to_payload(&self) -> AccountPayload {
        AccountPayload {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            create_time: self.create_time,
            expire_time: self.expire_time,
            user_id: self.user_id,
            is_used: self.is_used,
            is_deleted: self.is_deleted,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_time <= now
    }
}

/// Client-facing account payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPayload {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub create_time: i64,
    pub expire_time: i64,
    pub user_id: Uuid,
    pub is_used: i16,
    pub is_deleted: i16,
}
