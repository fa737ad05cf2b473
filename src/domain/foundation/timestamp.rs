//! UTC instants used for session schedules, joins, messages and events.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wall-clock now. Handlers take time from a `Clock` port instead.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Whole seconds from `earlier` to `self`; negative if `earlier` is later.
    pub fn seconds_since(&self, earlier: &Timestamp) -> i64 {
        self.0.signed_duration_since(earlier.0).num_seconds()
    }

    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    pub fn plus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 + Duration::minutes(minutes))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> Timestamp {
        DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
            .into()
    }

    #[test]
    fn ordering_helpers_agree() {
        let earlier = fixed();
        let later = earlier.plus_secs(5);

        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
        assert!(earlier < later);
    }

    #[test]
    fn seconds_since_counts_whole_seconds() {
        let start = fixed();
        let end = start.plus_minutes(90).plus_secs(7);
        assert_eq!(end.seconds_since(&start), 5407);
        assert_eq!(start.seconds_since(&end), -5407);
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let json = serde_json::to_string(&fixed()).unwrap();
        assert_eq!(json, "\"2024-01-15T10:30:00Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fixed());
    }
}
