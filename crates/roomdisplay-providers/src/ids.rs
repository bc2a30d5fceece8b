//! Placeholder identifiers for records without a UID.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Supplies identifiers for event records that carry no UID.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Returns a fresh identifier.
    fn next_id(&self) -> String;
}

/// Wall-clock time plus a random component.
///
/// Identifiers are unique in practice but differ on every parse.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        format!(
            "event-{}-{:016x}",
            Utc::now().timestamp_millis(),
            rand::random::<u64>()
        )
    }
}

/// A monotonic counter: `event-1`, `event-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: AtomicU64,
}

impl SequentialIds {
    /// Creates a counter starting at `event-1`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("event-{}", n)
    }
}
