//! Pass identifiers.
//!
//! An id is `GP` followed by a Unix timestamp in milliseconds. The generator
//! never issues the same value twice: when the clock has not advanced past the
//! last issued value it hands out `last + 1`, so ids stay strictly increasing
//! even under bursts within one millisecond or a clock stepping backwards.
//! Once the numeric space is used up, `generate` fails rather than wrapping.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::errors::AppError;

pub const PASS_ID_PREFIX: &str = "GP";

#[derive(Debug, Default)]
pub struct PassIdGenerator {
    last: AtomicI64,
}

impl PassIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh id from the current wall clock.
    pub fn generate(&self) -> Result<String, AppError> {
        let value = self
            .next_after(Utc::now().timestamp_millis())
            .ok_or_else(|| anyhow::anyhow!("pass id space exhausted"))?;
        Ok(format_pass_id(value))
    }

    /// Record an id issued elsewhere (e.g. loaded from disk) so it is never
    /// handed out again. Ids not in the `GP<millis>` shape are ignored.
    pub fn observe(&self, id: &str) {
        if let Some(value) = parse_pass_id(id) {
            self.last.fetch_max(value, Ordering::SeqCst);
        }
    }

    fn next_after(&self, now_ms: i64) -> Option<i64> {
        let bump = |last: i64| {
            if now_ms > last {
                Some(now_ms)
            } else {
                last.checked_add(1)
            }
        };
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, bump)
            .ok()
            .and_then(bump)
    }
}

pub fn format_pass_id(value: i64) -> String {
    format!("{}{}", PASS_ID_PREFIX, value)
}

/// Numeric part of a well-formed pass id.
pub fn parse_pass_id(id: &str) -> Option<i64> {
    let digits = id.strip_prefix(PASS_ID_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
