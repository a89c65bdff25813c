//! # wp-api
//!
//! HTTP API layer for the woodpecker tool-shop backend.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Token and role gates as middleware
//! - REST endpoints for tools, users, orders, payments and reviews
//!
//! ## Endpoints
//!
//! | Method | Path | Gate | Description |
//! |--------|------|------|-------------|
//! | GET | `/health` | - | Health check |
//! | POST | `/create-payment-intent` | token | Card payment intent |
//! | GET | `/admin/{email}` | - | Admin status |
//! | PUT | `/user/admin/{email}` | admin | Promote to admin |
//! | PUT | `/user/{email}` | - | Upsert profile, issue token |
//! | GET | `/users` | token | List users |
//! | GET | `/tools`, `/tools/{id}` | - | Tool catalog |
//! | POST | `/tool` | admin | Add a tool |
//! | POST | `/orders` | - | Place an order |
//! | GET | `/orders?email=` | self | Caller's orders |
//! | GET/DELETE/PATCH | `/order/{id}` | token | Read, delete, reconcile payment |
//! | PUT | `/comments` | - | Upsert a review |
//! | GET | `/review` | - | List reviews |

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
