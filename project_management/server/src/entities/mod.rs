//! SeaORM entities, one per table created by the `migration` crate.

use chrono::{DateTime, Utc};

pub mod project;
pub mod task;
pub mod user;

/// Seconds from the Unix epoch back to `0001-01-01T00:00:00Z`.
const ZERO_TIMESTAMP_SECS: i64 = -62_135_596_800;

/// The zero instant, `0001-01-01T00:00:00Z`, stored for timestamps a client
/// leaves out of a request body.
pub fn zero_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(ZERO_TIMESTAMP_SECS, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_produce_year_one_as_zero_timestamp() {
        assert_eq!(zero_timestamp().to_rfc3339(), "0001-01-01T00:00:00+00:00");
    }
}
