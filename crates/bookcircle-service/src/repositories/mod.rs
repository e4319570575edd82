//! Persistence layer.
//!
//! The auth service depends only on the [`AccountStore`] and [`BookStore`]
//! traits. Postgres implementations back the deployed service; in-memory
//! implementations back tests and local development.

pub mod accounts;
pub mod books;
pub mod memory;

pub use accounts::{AccountStore, PgAccountStore};
pub use books::{BookStore, PgBookStore};
pub use memory::{MemoryAccountStore, MemoryBookStore};
