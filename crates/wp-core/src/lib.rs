//! # wp-core
//!
//! Core records, access control and order lifecycle for the woodpecker
//! tool-shop backend.
//!
//! This crate provides:
//! - Typed records: `Tool`, `User`, `Order`, `Payment`, `Comment`
//! - `DocumentId` for store keys, validated at the boundary
//! - Repository traits (`Store`) and an in-memory `MemoryStore`
//! - `TokenService` (token verifier) and `Authorizer` (role authorizer)
//! - `OrderLifecycle` for the unpaid → paid transition
//! - `PaymentGateway` trait for the payment processor
//! - `AppError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wp_core::{MemoryStore, OrderLifecycle, SharedStore};
//!
//! let store: SharedStore = Arc::new(MemoryStore::new());
//! let orders = OrderLifecycle::new(store);
//!
//! let created = orders.create_order(new_order).await?;
//! orders.reconcile_payment(&created.inserted_id, confirmation).await?;
//! ```

pub mod authorize;
pub mod comment;
pub mod error;
pub mod gateway;
pub mod id;
pub mod lifecycle;
pub mod memory;
pub mod order;
pub mod store;
pub mod token;
pub mod tool;
pub mod user;

// Re-exports for convenience
pub use authorize::{Authorizer, Capability};
pub use comment::{Comment, NewComment};
pub use error::{AppError, AppResult};
pub use gateway::{BoxedPaymentGateway, ClientSecret, Currency, IntentRequest, PaymentGateway};
pub use id::DocumentId;
pub use lifecycle::{OrderLifecycle, PaidUpdate};
pub use memory::MemoryStore;
pub use order::{NewOrder, Order, Payment, PaymentConfirmation};
pub use store::{
    CommentRepository, DeleteResult, InsertResult, OrderRepository, SharedStore, Store,
    ToolRepository, UpdateResult, UserRepository,
};
pub use token::{Claims, TokenService, CREDENTIAL_HEADER};
pub use tool::{NewTool, Tool};
pub use user::{Role, User, UserProfile};
