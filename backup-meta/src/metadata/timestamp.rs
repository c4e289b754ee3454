//! Timestamps as they are stored in sentinels.
//!
//! Sentinels keep the offset they were written with, so DTOs hold
//! `DateTime<FixedOffset>` and rewrite it unchanged. Writers with no time to
//! record store the zero instant `0001-01-01T00:00:00Z`.

use chrono::{DateTime, FixedOffset, Utc};

/// Unix seconds of `0001-01-01T00:00:00Z`
const ZERO_INSTANT_SECS: i64 = -62_135_596_800;

/// A stored timestamp, with its original offset
pub type SentinelTime = Option<DateTime<FixedOffset>>;

pub fn is_zero_instant(time: &DateTime<Utc>) -> bool {
    time.timestamp() == ZERO_INSTANT_SECS && time.timestamp_subsec_nanos() == 0
}

/// UTC projection of a stored timestamp; the zero instant reads as absent
pub fn to_utc(time: SentinelTime) -> Option<DateTime<Utc>> {
    time.map(|t| t.with_timezone(&Utc))
        .filter(|t| !is_zero_instant(t))
}
