//! Fixed test IDs and secrets for deterministic tests.
//!
//! Using fixed values prevents flaky tests caused by random data.

use uuid::Uuid;

// Account IDs (100-199)
pub const TEST_ACCOUNT_ALICE: Uuid = Uuid::from_u128(100);
pub const TEST_ACCOUNT_BOB: Uuid = Uuid::from_u128(101);
pub const TEST_ACCOUNT_CHARLIE: Uuid = Uuid::from_u128(102);

// Book IDs (1000-1099)
pub const TEST_BOOK_FIRST: Uuid = Uuid::from_u128(1000);
pub const TEST_BOOK_SECOND: Uuid = Uuid::from_u128(1001);

// Token secrets (32+ bytes, as the config requires)
pub const TEST_ACCESS_SECRET: &str = "test-access-secret-do-not-use-in-production";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-do-not-use-in-production";

// Default seeded password
pub const TEST_PASSWORD: &str = "hunter22";
