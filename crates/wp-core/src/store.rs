//! # Repository Traits
//!
//! The document store seam. Each collection gets its own repository trait;
//! a [`Store`] is anything that implements all of them. Backends:
//! MongoDB (`wp-mongo`) and the in-process [`MemoryStore`](crate::MemoryStore).
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        Store (trait)                      │
//! │  ToolRepository  UserRepository  OrderRepository  Comment │
//! └───────────────────────────────────────────────────────────┘
//!                              ▲
//!                ┌─────────────┴─────────────┐
//!        ┌───────┴───────┐           ┌───────┴───────┐
//!        │  MongoStore   │           │  MemoryStore  │
//!        └───────────────┘           └───────────────┘
//! ```
//!
//! Write operations answer with the store's acknowledgement shapes, which
//! the HTTP layer passes straight through to clients.

use crate::comment::Comment;
use crate::error::AppResult;
use crate::id::DocumentId;
use crate::order::{Order, Payment};
use crate::tool::Tool;
use crate::user::{Role, User, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

impl InsertResult {
    pub fn new(inserted_id: DocumentId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<DocumentId>,
}

impl UpdateResult {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_id: None,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: None,
        }
    }

    pub fn upserted(id: DocumentId) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Tool catalog collection
#[async_trait]
pub trait ToolRepository: Send + Sync {
    async fn insert_tool(&self, tool: Tool) -> AppResult<InsertResult>;

    async fn find_tool(&self, id: &DocumentId) -> AppResult<Option<Tool>>;

    async fn list_tools(&self) -> AppResult<Vec<Tool>>;
}

/// User collection, keyed by email
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the user or replace its whole profile. The role is left untouched.
    async fn upsert_user(&self, email: &str, profile: UserProfile) -> AppResult<UpdateResult>;

    async fn find_user(&self, email: &str) -> AppResult<Option<User>>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Set the role of an existing user. Unknown emails match nothing.
    async fn set_role(&self, email: &str, role: Role) -> AppResult<UpdateResult>;
}

/// Order and payment collections
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert_order(&self, order: Order) -> AppResult<InsertResult>;

    async fn find_order(&self, id: &DocumentId) -> AppResult<Option<Order>>;

    async fn list_orders_by_email(&self, email: &str) -> AppResult<Vec<Order>>;

    /// Zero matches is a successful delete with `deleted_count == 0`.
    async fn delete_order(&self, id: &DocumentId) -> AppResult<DeleteResult>;

    /// Set `paid` and `transactionId` on the order and insert `payment`,
    /// both inside one transaction.
    ///
    /// Returns `None` without writing anything when the order does not exist.
    async fn record_payment(
        &self,
        order_id: &DocumentId,
        payment: Payment,
    ) -> AppResult<Option<UpdateResult>>;

    async fn list_payments_for_order(&self, order_id: &DocumentId) -> AppResult<Vec<Payment>>;
}

/// Review comments, keyed by email
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert or fully replace the comment stored for `comment.email`.
    async fn upsert_comment(&self, comment: Comment) -> AppResult<UpdateResult>;

    async fn list_comments(&self) -> AppResult<Vec<Comment>>;
}

/// A complete document store backend
#[async_trait]
pub trait Store: ToolRepository + UserRepository + OrderRepository + CommentRepository {
    /// Backend name (for logging)
    fn backend(&self) -> &'static str;

    /// Round-trip to the backend
    async fn ping(&self) -> AppResult<()>;
}

/// Type alias for a shared store (dynamic dispatch)
pub type SharedStore = Arc<dyn Store>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_wire_shapes() {
        let id = DocumentId::parse("64b7f0c2a1b2c3d4e5f60718").unwrap();
        assert_eq!(
            serde_json::to_value(InsertResult::new(id.clone())).unwrap(),
            json!({"acknowledged": true, "insertedId": "64b7f0c2a1b2c3d4e5f60718"})
        );
        assert_eq!(
            serde_json::to_value(UpdateResult::upserted(id)).unwrap(),
            json!({
                "acknowledged": true,
                "matchedCount": 0,
                "modifiedCount": 0,
                "upsertedId": "64b7f0c2a1b2c3d4e5f60718"
            })
        );
        assert_eq!(
            serde_json::to_value(DeleteResult::new(0)).unwrap(),
            json!({"acknowledged": true, "deletedCount": 0})
        );
    }
}
