//! Identifier generation.
//!
//! Ids look like `trans_1704456000000_3f9c2a1b7`: an entity prefix, the creation time in
//! milliseconds and nine random hex characters. Collisions are not checked for.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix for transaction ids
pub const TRANSACTION_PREFIX: &str = "trans";
/// Prefix for category ids
pub const CATEGORY_PREFIX: &str = "cat";
/// Prefix for budget ids
pub const BUDGET_PREFIX: &str = "budget";

const SUFFIX_LEN: usize = 9;

/// Generates an id for `prefix` stamped with `now`.
#[must_use]
pub fn generate_id_at(prefix: &str, now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}_{}_{}",
        now.timestamp_millis(),
        &random[..SUFFIX_LEN]
    )
}

/// Generates an id for `prefix` stamped with the current time.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    generate_id_at(prefix, Utc::now())
}
