//! Core library for the partnership dashboard.
//!
//! This crate provides the domain models, the SQLite record store, and the
//! client-side cache with its optimistic mutation protocol, independent of
//! any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use dashboard_core::{Dashboard, Database};
//!
//! # tokio_test::block_on(async {
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let mut dashboard = Dashboard::new(Arc::new(db));
//! dashboard.load_ideas().await?;
//! for column in dashboard.ideas_board() {
//!     println!("{}: {}", column.label, column.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! # }).unwrap();
//! ```

pub mod aggregate;
pub mod auth;
pub mod cache;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod mutation;
pub mod notify;
pub mod store;

// Re-export commonly used types at crate root
pub use cache::EntityCache;
pub use dashboard::{Dashboard, DashboardConfig, Navigation, Route};
pub use db::Database;
pub use error::{DashboardError, StoreError, ValidationError};
pub use mutation::ConcurrencyPolicy;
pub use store::{Query, Record, RecordStore, Row, Table};
