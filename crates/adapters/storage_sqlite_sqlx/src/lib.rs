//! # inksync-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `AutomationStore` and `CalendarStore` from `inksync-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `inksync-app` (for port traits) and `inksync-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod automation_store;
pub mod calendar_store;
pub mod error;
pub mod pool;

pub use automation_store::SqliteAutomationStore;
pub use calendar_store::SqliteCalendarStore;
pub use error::StorageError;
pub use pool::{Config, Database};
