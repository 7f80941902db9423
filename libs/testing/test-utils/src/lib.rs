//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: PostgreSQL container with migrations applied and
//!   automatic cleanup (feature: "postgres")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let name = builder.name("event", "main");
//!     let begins = builder.day(3);
//! }
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime};

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_event");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("event", "main"), "test-event-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A partner id in `1..=100_000`, stable for a given seed and `n`
    pub fn partner_id(&self, n: u32) -> i32 {
        let mixed = self.seed.wrapping_mul(6364136223846793005).wrapping_add(n as u64);
        (mixed % 100_000) as i32 + 1
    }

    /// Midnight, `offset` days after a seed-dependent anchor in 2024
    pub fn day(&self, offset: i64) -> NaiveDateTime {
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        anchor + Duration::days((self.seed % 300) as i64 + offset)
    }
}

/// Test assertion helpers
pub mod assertions {
    use chrono::NaiveDateTime;

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert timestamps never increase from one element to the next
    pub fn assert_descending(dates: &[NaiveDateTime], context: &str) {
        for pair in dates.windows(2) {
            assert!(
                pair[0] >= pair[1],
                "{}: {} comes before later {}",
                context,
                pair[0],
                pair[1]
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.partner_id(1), builder2.partner_id(1));
        assert_eq!(builder1.day(2), builder2.day(2));
        assert_eq!(builder1.name("event", "test"), builder2.name("event", "test"));
    }

    #[test]
    fn test_data_builder_from_name() {
        let builder1 = TestDataBuilder::from_test_name("my_test");
        let builder2 = TestDataBuilder::from_test_name("my_test");

        assert_eq!(builder1.day(0), builder2.day(0));
    }

    #[test]
    fn test_day_offsets() {
        let builder = TestDataBuilder::new(5);
        assert_eq!(builder.day(3) - builder.day(1), Duration::days(2));
    }

    #[test]
    fn test_partner_id_in_range() {
        let builder = TestDataBuilder::from_test_name("range");
        for n in 0..50 {
            let id = builder.partner_id(n);
            assert!((1..=100_000).contains(&id));
        }
    }

    #[test]
    #[should_panic(expected = "comes before later")]
    fn test_assert_descending_detects_ascending() {
        let builder = TestDataBuilder::new(1);
        assertions::assert_descending(&[builder.day(0), builder.day(1)], "dates");
    }
}
