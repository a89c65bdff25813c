//! # Order and Payment Records
//!
//! An order is created unpaid and becomes paid when a payment confirmation
//! for it is reconciled. Each reconciliation also leaves a payment record.

use crate::error::AppResult;
use crate::id::DocumentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An order for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    /// Owner of the order (foreign key to the user's email)
    pub user_email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// Total in major currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub paid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    /// Absent on orders placed before timestamps were recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.paid
    }
}

/// Body of an order submission
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[validate(email(message = "userEmail must be an email address"))]
    pub user_email: String,

    #[serde(default)]
    pub user_name: Option<String>,

    #[serde(default)]
    pub tool_id: Option<String>,

    #[serde(default)]
    pub tool_name: Option<String>,

    #[serde(default)]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<u32>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "totalPrice must not be negative"))]
    pub total_price: Option<f64>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,
}

impl NewOrder {
    /// Validate the submission and produce an unpaid order
    pub fn into_order(self) -> AppResult<Order> {
        self.validate()?;
        Ok(Order {
            id: DocumentId::generate(),
            user_email: self.user_email,
            user_name: self.user_name,
            tool_id: self.tool_id,
            tool_name: self.tool_name,
            quantity: self.quantity,
            total_price: self.total_price,
            address: self.address,
            phone: self.phone,
            paid: false,
            transaction_id: None,
            created_at: Some(Utc::now()),
        })
    }
}

/// Payment confirmation sent by the client once the processor has charged the card
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    #[validate(length(min = 1, message = "transactionId must not be empty"))]
    pub transaction_id: String,

    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,

    #[serde(default)]
    pub user_email: Option<String>,

    #[serde(default)]
    pub tool_name: Option<String>,
}

/// Record of a reconciled payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    pub order_id: DocumentId,

    pub transaction_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Denormalize a confirmation into a payment record for `order_id`
    pub fn from_confirmation(order_id: DocumentId, confirmation: PaymentConfirmation) -> Self {
        Self {
            id: DocumentId::generate(),
            order_id,
            transaction_id: confirmation.transaction_id,
            amount: confirmation.amount,
            user_email: confirmation.user_email,
            tool_name: confirmation.tool_name,
            created_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[test]
    fn test_new_order_is_unpaid() {
        let new: NewOrder = serde_json::from_value(json!({
            "userEmail": "ada@example.com",
            "toolName": "Claw Hammer",
            "quantity": 20,
            "totalPrice": 250.0
        }))
        .unwrap();
        let order = new.into_order().unwrap();
        assert!(!order.is_paid());
        assert!(order.transaction_id.is_none());
    }

    #[test]
    fn test_order_without_timestamp() {
        let order: Order = serde_json::from_value(json!({
            "_id": "64b7f0c2a1b2c3d4e5f60718",
            "userEmail": "ada@example.com",
            "toolName": "Saw",
            "paid": true,
            "transactionId": "pi_1"
        }))
        .unwrap();
        assert!(order.created_at.is_none());
        assert!(order.is_paid());

        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("createdAt").is_none());
    }

    #[test]
    fn test_order_requires_user_email() {
        let missing = serde_json::from_value::<NewOrder>(json!({"toolName": "Saw"}));
        assert!(missing.is_err());

        let bad: NewOrder = serde_json::from_value(json!({"userEmail": "nope"})).unwrap();
        assert!(matches!(bad.into_order(), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_payment_from_confirmation() {
        let order_id = DocumentId::generate();
        let confirmation: PaymentConfirmation = serde_json::from_value(json!({
            "transactionId": "pi_123",
            "amount": 250.0
        }))
        .unwrap();
        let payment = Payment::from_confirmation(order_id.clone(), confirmation);
        assert_eq!(payment.order_id, order_id);
        assert_eq!(payment.transaction_id, "pi_123");
        assert_eq!(payment.amount, Some(250.0));
    }
}
