//! # In-Memory Store
//!
//! A [`Store`] kept in process memory. Used for local development when no
//! database is configured, and as the backend of the HTTP test suite.
//! All collections live behind one lock, so multi-document writes such as
//! [`OrderRepository::record_payment`] are atomic.

use crate::comment::Comment;
use crate::error::AppResult;
use crate::id::DocumentId;
use crate::order::{Order, Payment};
use crate::store::{
    CommentRepository, DeleteResult, InsertResult, OrderRepository, Store, ToolRepository,
    UpdateResult, UserRepository,
};
use crate::tool::Tool;
use crate::user::{Role, User, UserProfile};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Collections {
    tools: Vec<Tool>,
    users: Vec<User>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
    comments: Vec<Comment>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ToolRepository for MemoryStore {
    async fn insert_tool(&self, tool: Tool) -> AppResult<InsertResult> {
        let id = tool.id.clone();
        self.inner.write().await.tools.push(tool);
        Ok(InsertResult::new(id))
    }

    async fn find_tool(&self, id: &DocumentId) -> AppResult<Option<Tool>> {
        let inner = self.inner.read().await;
        Ok(inner.tools.iter().find(|t| &t.id == id).cloned())
    }

    async fn list_tools(&self) -> AppResult<Vec<Tool>> {
        Ok(self.inner.read().await.tools.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn upsert_user(&self, email: &str, profile: UserProfile) -> AppResult<UpdateResult> {
        let mut inner = self.inner.write().await;
        match inner.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                let modified = user.profile != profile;
                user.profile = profile;
                Ok(UpdateResult::matched(modified))
            }
            None => {
                let user = User::new(email, profile);
                let id = user.id.clone();
                inner.users.push(user);
                Ok(UpdateResult::upserted(id))
            }
        }
    }

    async fn find_user(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn set_role(&self, email: &str, role: Role) -> AppResult<UpdateResult> {
        let mut inner = self.inner.write().await;
        match inner.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                let modified = user.role != Some(role);
                user.role = Some(role);
                Ok(UpdateResult::matched(modified))
            }
            None => Ok(UpdateResult::unmatched()),
        }
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert_order(&self, order: Order) -> AppResult<InsertResult> {
        let id = order.id.clone();
        self.inner.write().await.orders.push(order);
        Ok(InsertResult::new(id))
    }

    async fn find_order(&self, id: &DocumentId) -> AppResult<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| &o.id == id).cloned())
    }

    async fn list_orders_by_email(&self, email: &str) -> AppResult<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .filter(|o| o.user_email == email)
            .cloned()
            .collect())
    }

    async fn delete_order(&self, id: &DocumentId) -> AppResult<DeleteResult> {
        let mut inner = self.inner.write().await;
        let before = inner.orders.len();
        inner.orders.retain(|o| &o.id != id);
        Ok(DeleteResult::new((before - inner.orders.len()) as u64))
    }

    async fn record_payment(
        &self,
        order_id: &DocumentId,
        payment: Payment,
    ) -> AppResult<Option<UpdateResult>> {
        let mut inner = self.inner.write().await;
        let Some(order) = inner.orders.iter_mut().find(|o| &o.id == order_id) else {
            return Ok(None);
        };
        let modified =
            !order.paid || order.transaction_id.as_deref() != Some(payment.transaction_id.as_str());
        order.paid = true;
        order.transaction_id = Some(payment.transaction_id.clone());
        inner.payments.push(payment);
        Ok(Some(UpdateResult::matched(modified)))
    }

    async fn list_payments_for_order(&self, order_id: &DocumentId) -> AppResult<Vec<Payment>> {
        let inner = self.inner.read().await;
        Ok(inner
            .payments
            .iter()
            .filter(|p| &p.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn upsert_comment(&self, comment: Comment) -> AppResult<UpdateResult> {
        let mut inner = self.inner.write().await;
        match inner.comments.iter_mut().find(|c| c.email == comment.email) {
            Some(existing) => {
                let replacement = Comment {
                    id: existing.id.clone(),
                    ..comment
                };
                let modified = *existing != replacement;
                *existing = replacement;
                Ok(UpdateResult::matched(modified))
            }
            None => {
                let id = comment.id.clone();
                inner.comments.push(comment);
                Ok(UpdateResult::upserted(id))
            }
        }
    }

    async fn list_comments(&self) -> AppResult<Vec<Comment>> {
        Ok(self.inner.read().await.comments.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::NewOrder;
    use serde_json::json;

    fn order_for(email: &str) -> Order {
        serde_json::from_value::<NewOrder>(json!({ "userEmail": email }))
            .unwrap()
            .into_order()
            .unwrap()
    }

    fn profile(value: serde_json::Value) -> UserProfile {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_user_upsert_replaces_profile() {
        let store = MemoryStore::new();
        let first = store
            .upsert_user("ada@example.com", profile(json!({"name": "Ada", "city": "London"})))
            .await
            .unwrap();
        assert!(first.upserted_id.is_some());

        let second = store
            .upsert_user("ada@example.com", profile(json!({"name": "Ada L."})))
            .await
            .unwrap();
        assert_eq!(second.matched_count, 1);

        let user = store.find_user("ada@example.com").await.unwrap().unwrap();
        assert_eq!(user.profile, profile(json!({"name": "Ada L."})));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_role_survives_profile_upsert() {
        let store = MemoryStore::new();
        store.upsert_user("root@example.com", UserProfile::new()).await.unwrap();
        store.set_role("root@example.com", Role::Admin).await.unwrap();
        store
            .upsert_user("root@example.com", profile(json!({"name": "Root"})))
            .await
            .unwrap();

        let user = store.find_user("root@example.com").await.unwrap().unwrap();
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_set_role_unknown_user() {
        let store = MemoryStore::new();
        let result = store.set_role("ghost@example.com", Role::Admin).await.unwrap();
        assert_eq!(result.matched_count, 0);
        assert!(store.find_user("ghost@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_order_is_zero_count() {
        let store = MemoryStore::new();
        let result = store.delete_order(&DocumentId::generate()).await.unwrap();
        assert_eq!(result.deleted_count, 0);
    }

    #[tokio::test]
    async fn test_record_payment_missing_order_writes_nothing() {
        let store = MemoryStore::new();
        let order_id = DocumentId::generate();
        let payment = Payment::from_confirmation(
            order_id.clone(),
            serde_json::from_value(json!({"transactionId": "pi_1"})).unwrap(),
        );
        assert!(store.record_payment(&order_id, payment).await.unwrap().is_none());
        assert!(store.list_payments_for_order(&order_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_orders_filtered_by_email() {
        let store = MemoryStore::new();
        store.insert_order(order_for("ada@example.com")).await.unwrap();
        store.insert_order(order_for("bob@example.com")).await.unwrap();
        store.insert_order(order_for("ada@example.com")).await.unwrap();

        let orders = store.list_orders_by_email("ada@example.com").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.user_email == "ada@example.com"));
    }

    #[tokio::test]
    async fn test_comment_upsert_keeps_one_per_email() {
        let store = MemoryStore::new();
        for review in ["Good", "Great"] {
            let comment = serde_json::from_value::<crate::comment::NewComment>(
                json!({"email": "ada@example.com", "review": review}),
            )
            .unwrap()
            .into_comment()
            .unwrap();
            store.upsert_comment(comment).await.unwrap();
        }
        let comments = store.list_comments().await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].review, "Great");
    }
}
