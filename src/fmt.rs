//! Mapping helpers shared by the image and container aggregators.

use chrono::{DateTime, Utc};

/// Width of identifiers exposed by the API, for image digests and container
/// ids alike.
const SHORT_ID_LEN: usize = 12;

/// Strips a `sha256:` digest prefix and truncates to [`SHORT_ID_LEN`]
/// characters. Identifiers are always derived this way from the full digest,
/// never taken from a separate engine field.
pub fn short_id(id: &str) -> String {
    let id = id.strip_prefix("sha256:").unwrap_or(id);
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Formats a byte count as megabytes with two decimal places, e.g. `2.00MB`.
pub fn size_mb(bytes: i64) -> String {
    format!("{:.2}MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Renders a unix timestamp with the fixed display pattern, e.g.
/// `Jan 2, 2006 3:04 PM` (UTC).
pub fn created_at(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|instant| instant.format("%b %-d, %Y %-I:%M %p").to_string())
        .unwrap_or_default()
}

/// Whole seconds elapsed at `now` since the engine-reported RFC 3339
/// creation instant, clamped at zero. The value is a snapshot; two queries
/// separated by real time yield different ages for the same container.
pub fn age_seconds(created: Option<&str>, now: DateTime<Utc>) -> u64 {
    let Some(created) = created else { return 0 };
    match DateTime::parse_from_rfc3339(created) {
        Ok(instant) => (now - instant.with_timezone(&Utc)).num_seconds().max(0) as u64,
        Err(err) => {
            log::warn!("unparsable creation timestamp `{created}`: {err}");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_strips_prefix_and_truncates() {
        assert_eq!(short_id("sha256:abcdef0123456789"), "abcdef012345");
        assert_eq!(
            short_id("9f8e7d6c5b4a39281716051403020100feedbeef"),
            "9f8e7d6c5b4a"
        );
    }

    #[test]
    fn test_short_id_keeps_short_input() {
        assert_eq!(short_id("sha256:abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn test_size_mb() {
        assert_eq!(size_mb(2_097_152), "2.00MB");
        assert_eq!(size_mb(0), "0.00MB");
        assert_eq!(size_mb(1_572_864), "1.50MB");
    }

    #[test]
    fn test_created_at_fixed_pattern() {
        assert_eq!(created_at(0), "Jan 1, 1970 12:00 AM");
        // 2023-06-15 14:30:00 UTC
        assert_eq!(created_at(1_686_839_400), "Jun 15, 2023 2:30 PM");
    }

    #[test]
    fn test_age_seconds() {
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:01:30Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(age_seconds(Some("2024-01-01T00:00:00Z"), now), 90);
        // Sub-second precision rounds down to whole seconds.
        assert_eq!(age_seconds(Some("2023-12-31T23:59:59.500Z"), now), 90);
    }

    #[test]
    fn test_age_seconds_clamps_and_defaults() {
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(age_seconds(Some("2024-01-01T01:00:00Z"), now), 0);
        assert_eq!(age_seconds(Some("not a timestamp"), now), 0);
        assert_eq!(age_seconds(None, now), 0);
    }
}
