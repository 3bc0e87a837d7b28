//! Utility functions for the match rating service

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimal_places: u32) -> f64 {
    let factor = 10f64.powi(decimal_places as i32);
    (value * factor).round() / factor
}

/// Parse a client-supplied date: RFC 3339 timestamps or plain `YYYY-MM-DD`
/// (taken as midnight UTC)
pub fn parse_match_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
}

/// Serde adapter for match dates accepting the formats of `parse_match_date`
pub mod match_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_match_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid match date: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_match_id();
        let id2 = generate_match_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-1.2, 4), -1.2);
        assert_eq!(round_to(0.30000000000000004, 2), 0.3);
    }

    #[test]
    fn test_parse_match_date() {
        let day = parse_match_date("2024-03-02").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-03-02T00:00:00+00:00");

        let stamp = parse_match_date("2024-03-02T18:30:00+01:00").unwrap();
        assert_eq!(stamp.to_rfc3339(), "2024-03-02T17:30:00+00:00");

        assert!(parse_match_date("02/03/2024").is_none());
    }
}
