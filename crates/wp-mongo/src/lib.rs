//! # wp-mongo
//!
//! MongoDB document store for the woodpecker backend.
//!
//! `MongoStore` implements every repository trait from `wp-core` over one
//! pooled client. Payment reconciliation runs inside a session transaction,
//! so the deployment must be a replica set or sharded cluster.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wp_core::SharedStore;
//! use wp_mongo::MongoStore;
//!
//! let mongo = MongoStore::connect("mongodb://localhost:27017", "woodpecker-data").await?;
//! mongo.initialize_indexes().await?;
//! let store: SharedStore = Arc::new(mongo.clone());
//! ```

mod codec;
pub mod store;

pub use store::MongoStore;
