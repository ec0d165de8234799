//! Repository layer: table-scoped database operations.
//!
//! Functions take `&Connection` so they work equally on a plain connection
//! or inside a `Transaction` (which derefs to `Connection`).

mod audit;
mod record;

pub use audit::*;
pub use record::*;

use chrono::{DateTime, Utc};

use super::DatabaseError;

/// Timestamps are stored as fixed-width RFC 3339 (microseconds, `Z`) so
/// lexicographic order in SQLite equals chronological order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(
    column: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptedColumn {
            column,
            reason: e.to_string(),
        })
}
