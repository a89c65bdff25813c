//! # Order Lifecycle
//!
//! Orders have two states, unpaid and paid. Reconciliation moves an order to
//! paid and records the payment in the same store transaction. It is not
//! idempotent: every reconciliation call leaves one more payment record.

use crate::error::{AppError, AppResult};
use crate::id::DocumentId;
use crate::order::{NewOrder, Order, Payment, PaymentConfirmation};
use crate::store::{DeleteResult, InsertResult, OrderRepository, SharedStore};
use serde::Serialize;
use tracing::{info, instrument, warn};
use validator::Validate;

/// The update applied to an order on reconciliation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaidUpdate {
    #[serde(rename = "$set")]
    pub set: PaidFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidFields {
    pub paid: bool,
    pub transaction_id: String,
}

#[derive(Clone)]
pub struct OrderLifecycle {
    store: SharedStore,
}

impl OrderLifecycle {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Insert a new unpaid order
    #[instrument(skip(self, new), fields(user_email = %new.user_email))]
    pub async fn create_order(&self, new: NewOrder) -> AppResult<InsertResult> {
        let order = new.into_order()?;
        let result = self.store.insert_order(order).await?;
        info!(order_id = %result.inserted_id, "order created");
        Ok(result)
    }

    pub async fn list_orders_for_user(&self, email: &str) -> AppResult<Vec<Order>> {
        self.store.list_orders_by_email(email).await
    }

    pub async fn get_order(&self, id: &DocumentId) -> AppResult<Order> {
        self.store
            .find_order(id)
            .await?
            .ok_or_else(|| AppError::not_found("order", id.as_str()))
    }

    /// Remove the order whatever its state
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: &DocumentId) -> AppResult<DeleteResult> {
        let result = self.store.delete_order(id).await?;
        if result.deleted_count == 0 {
            warn!(order_id = %id, "delete matched no order");
        }
        Ok(result)
    }

    /// Mark the order paid with the confirmation's transaction id and
    /// persist the confirmation as a payment record.
    #[instrument(skip(self, confirmation), fields(transaction_id = %confirmation.transaction_id))]
    pub async fn reconcile_payment(
        &self,
        id: &DocumentId,
        confirmation: PaymentConfirmation,
    ) -> AppResult<PaidUpdate> {
        confirmation.validate()?;
        let update = PaidUpdate {
            set: PaidFields {
                paid: true,
                transaction_id: confirmation.transaction_id.clone(),
            },
        };

        let payment = Payment::from_confirmation(id.clone(), confirmation);
        let payment_id = payment.id.clone();
        let result = self
            .store
            .record_payment(id, payment)
            .await?
            .ok_or_else(|| AppError::not_found("order", id.as_str()))?;

        if result.modified_count == 0 {
            warn!(order_id = %id, "order was already paid with this transaction");
        }
        info!(order_id = %id, payment_id = %payment_id, "payment reconciled");
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::OrderRepository;
    use serde_json::json;
    use std::sync::Arc;

    fn new_order(email: &str) -> NewOrder {
        serde_json::from_value(json!({"userEmail": email, "toolName": "Claw Hammer"})).unwrap()
    }

    fn confirmation(transaction_id: &str) -> PaymentConfirmation {
        serde_json::from_value(json!({"transactionId": transaction_id, "amount": 120.0})).unwrap()
    }

    #[tokio::test]
    async fn test_reconcile_marks_paid_and_records_payment() {
        let store = Arc::new(MemoryStore::new());
        let orders = OrderLifecycle::new(store.clone());
        let id = orders.create_order(new_order("ada@example.com")).await.unwrap().inserted_id;

        let update = orders.reconcile_payment(&id, confirmation("pi_123")).await.unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"$set": {"paid": true, "transactionId": "pi_123"}})
        );

        let order = orders.get_order(&id).await.unwrap();
        assert!(order.paid);
        assert_eq!(order.transaction_id.as_deref(), Some("pi_123"));

        let payments = store.list_payments_for_order(&id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].transaction_id, "pi_123");
    }

    #[tokio::test]
    async fn test_reconcile_twice_duplicates_payment() {
        let store = Arc::new(MemoryStore::new());
        let orders = OrderLifecycle::new(store.clone());
        let id = orders.create_order(new_order("ada@example.com")).await.unwrap().inserted_id;

        orders.reconcile_payment(&id, confirmation("pi_123")).await.unwrap();
        orders.reconcile_payment(&id, confirmation("pi_123")).await.unwrap();

        let payments = store.list_payments_for_order(&id).await.unwrap();
        assert_eq!(payments.len(), 2);
        assert!(payments.iter().all(|p| p.transaction_id == "pi_123"));
    }

    #[tokio::test]
    async fn test_reconcile_unknown_order() {
        let store = Arc::new(MemoryStore::new());
        let orders = OrderLifecycle::new(store.clone());
        let id = DocumentId::generate();

        let err = orders.reconcile_payment(&id, confirmation("pi_1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(store.list_payments_for_order(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_rejects_empty_transaction() {
        let store = Arc::new(MemoryStore::new());
        let orders = OrderLifecycle::new(store);
        let id = orders.create_order(new_order("ada@example.com")).await.unwrap().inserted_id;

        let err = orders.reconcile_payment(&id, confirmation("")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(!orders.get_order(&id).await.unwrap().paid);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let store = Arc::new(MemoryStore::new());
        let orders = OrderLifecycle::new(store);
        let id = orders.create_order(new_order("ada@example.com")).await.unwrap().inserted_id;

        assert_eq!(orders.delete_order(&id).await.unwrap().deleted_count, 1);
        assert!(matches!(orders.get_order(&id).await, Err(AppError::NotFound { .. })));
        assert_eq!(orders.delete_order(&id).await.unwrap().deleted_count, 0);
    }
}
