//! # BookCircle Test Utilities
//!
//! Shared test utilities for the BookCircle auth service.
//!
//! This crate provides:
//! - Fixed test IDs and secrets for reproducible tests
//! - A token builder that signs real HS256 tokens (including expired ones)
//! - A server harness spawning the real router on in-memory stores
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookcircle_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestServer::spawn().await?;
//!     let account = server.seed_account("alice", "hunter22", Role::Reader).await?;
//!     let token = server.access_token_for(&account);
//!
//!     token.assert_valid_jwt().assert_role("reader");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
