//! Entity identifiers and creation timestamps
//!
//! Identifiers are opaque strings; entities loaded from snapshots may carry
//! arbitrary id values and are never re-keyed.

use chrono::Utc;
use uuid::Uuid;

/// Generate a fresh collision-resistant identifier
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current time in epoch milliseconds, the ordering stamp for new entities
pub fn timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}
