use chrono::DateTime;

use crate::parser::RawItem;

/// One release entry, transformed for display.
///
/// Every field may be empty: an entry is never dropped because the feed
/// omitted a field, so a rendered document always has one block per feed
/// item. Records live for a single fetch cycle and are never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseRecord {
    /// Build/internal version identifier
    pub version: String,
    /// User-facing version label
    pub short_version: String,
    /// Normalized display date, or the raw feed string if normalization failed
    pub publish_date: String,
    /// Release notes body; trusted HTML passes through verbatim
    pub description: String,
}

impl ReleaseRecord {
    pub fn from_raw(raw: RawItem) -> Self {
        Self {
            version: raw.version,
            short_version: raw.short_version,
            publish_date: normalize_pub_date(&raw.pub_date),
            description: strip_cdata(&raw.description),
        }
    }
}

/// Reformats an RFC 2822 date (`Wed, 04 Dec 2024 10:00:00 +0000`) to the
/// sortable `2024-12-04 10:00:00` form, keeping the timestamp's own offset.
///
/// A string that does not parse is returned unchanged - the record is still
/// useful without a normalized date.
pub fn normalize_pub_date(raw: &str) -> String {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(date) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Removes the literal CDATA section markers from description text.
///
/// Purely textual: the inner content, embedded markup included, is left
/// untouched. Parsed CDATA sections arrive without markers already; this
/// also covers feeds that carry the markers as escaped text.
pub fn strip_cdata(text: &str) -> String {
    text.replace("<![CDATA[", "").replace("]]>", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rfc2822_date() {
        assert_eq!(
            normalize_pub_date("Wed, 04 Dec 2024 10:00:00 +0000"),
            "2024-12-04 10:00:00"
        );
    }

    #[test]
    fn test_normalize_keeps_feed_offset() {
        // 09:00 at +0200 stays 09:00, not converted to UTC
        assert_eq!(
            normalize_pub_date("Tue, 05 Nov 2024 09:00:00 +0200"),
            "2024-11-05 09:00:00"
        );
    }

    #[test]
    fn test_normalize_gmt_suffix() {
        assert_eq!(
            normalize_pub_date("Mon, 09 Dec 2024 12:00:00 GMT"),
            "2024-12-09 12:00:00"
        );
    }

    #[test]
    fn test_normalize_tolerates_surrounding_whitespace() {
        assert_eq!(
            normalize_pub_date("  Wed, 04 Dec 2024 10:00:00 +0000  "),
            "2024-12-04 10:00:00"
        );
    }

    #[test]
    fn test_malformed_date_passes_through() {
        assert_eq!(normalize_pub_date("not-a-date"), "not-a-date");
        assert_eq!(normalize_pub_date(""), "");
    }

    #[test]
    fn test_strip_cdata_markers() {
        assert_eq!(
            strip_cdata("<![CDATA[<p>Fixed bug</p>]]>"),
            "<p>Fixed bug</p>"
        );
    }

    #[test]
    fn test_strip_cdata_leaves_plain_text_alone() {
        assert_eq!(strip_cdata("<p>No wrapper here</p>"), "<p>No wrapper here</p>");
    }

    #[test]
    fn test_strip_cdata_all_occurrences() {
        assert_eq!(
            strip_cdata("<![CDATA[a]]> and <![CDATA[b]]>"),
            "a and b"
        );
    }

    #[test]
    fn test_from_raw_applies_transforms() {
        let raw = RawItem {
            version: "2100".to_string(),
            short_version: "2.1".to_string(),
            pub_date: "Wed, 04 Dec 2024 10:00:00 +0000".to_string(),
            description: "<![CDATA[<p>Fixed bug</p>]]>".to_string(),
        };

        let record = ReleaseRecord::from_raw(raw);

        assert_eq!(record.version, "2100");
        assert_eq!(record.short_version, "2.1");
        assert_eq!(record.publish_date, "2024-12-04 10:00:00");
        assert_eq!(record.description, "<p>Fixed bug</p>");
    }

    #[test]
    fn test_from_raw_keeps_empty_fields() {
        let record = ReleaseRecord::from_raw(RawItem::default());
        assert_eq!(record, ReleaseRecord::default());
    }
}
