//! Shared test utilities for the domain crates
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo", default)
//! - `TestDataBuilder`: deterministic ids, names and emails
//! - `assertions`: small assertion helpers
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_repository_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_repository_test");
//!
//!     let buyer = builder.id("buyer");
//!     let email = builder.email("buyer");
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Builder for test data with deterministic randomization
///
/// The same test name always yields the same data, so failures reproduce.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name. This is the usual way to create a builder.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_submit_application");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        Self::new(hash_of(name))
    }

    /// Primary user id for the test
    pub fn user_id(&self) -> Uuid {
        self.id("user")
    }

    /// A stable id per `label`; different labels give different ids.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("thread_test");
    /// assert_ne!(builder.id("buyer"), builder.id("farmer"));
    /// assert_eq!(builder.id("buyer"), builder.id("buyer"));
    /// ```
    pub fn id(&self, label: &str) -> Uuid {
        let label_hash = hash_of(label);
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..].copy_from_slice(&label_hash.to_le_bytes());
        Uuid::from_bytes(bytes)
    }

    /// `test-{prefix}-{seed}-{suffix}`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A unique, lowercase email address for `label`
    pub fn email(&self, label: &str) -> String {
        format!("{}.{}@agronet.test", label.to_lowercase(), self.seed)
    }
}

fn hash_of(value: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that a slice is sorted by `key`, descending
    pub fn assert_sorted_desc<T, K: PartialOrd>(items: &[T], key: impl Fn(&T) -> K, context: &str) {
        for pair in items.windows(2) {
            assert!(
                key(&pair[0]) >= key(&pair[1]),
                "{}: items are not in descending order",
                context
            );
        }
    }
}
