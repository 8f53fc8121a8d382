use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Rupee amounts the way partners read them: `₹1.2Cr`, `₹15.0L`, `₹50,000`.
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let value = amount.abs();
    // Tiers are picked on the value as displayed, so 99,99,999 reads 1.0Cr
    // rather than 100.0L.
    let lakhs_shown = (value / LAKH * 10.0).round() / 10.0;
    if value >= CRORE || lakhs_shown >= 100.0 {
        format!("{sign}₹{:.1}Cr", value / CRORE)
    } else if value.round() >= LAKH {
        format!("{sign}₹{:.1}L", value / LAKH)
    } else {
        format!("{sign}₹{}", group_indian(value.round() as u64))
    }
}

/// Indian digit grouping: the last three digits, then pairs (`12,34,567`).
pub fn group_indian(number: u64) -> String {
    let digits = number.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<String> = head
        .chars()
        .rev()
        .chunks(2)
        .into_iter()
        .map(|chunk| chunk.collect::<String>().chars().rev().collect())
        .collect();
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn parse_month_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok()
}

/// Newest month first. Keys that are not `YYYY-MM` go last, in input order.
pub fn sort_month_keys_desc<S: AsRef<str>>(keys: &[S]) -> Vec<String> {
    keys.iter()
        .map(|k| k.as_ref().to_string())
        .sorted_by(|a, b| match (parse_month_key(a), parse_month_key(b)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
        .collect()
}

/// `2024-12` → `Dec 2024`. Unparseable keys are returned as they are.
pub fn format_month_key(key: &str) -> String {
    parse_month_key(key)
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_else(|| key.to_string())
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Badge colour for payment, GST and lead status labels.
pub fn status_color(status: &str) -> &'static str {
    let normalized = status.to_ascii_lowercase().replace(['_', '-', ' '], "");
    match normalized.as_str() {
        "paid" | "received" | "approved" | "disbursed" | "completed" => "#16A34A",
        "pending" | "processing" | "inprogress" | "submitted" => "#F59E0B",
        "failed" | "rejected" | "cancelled" => "#DC2626",
        "onhold" => "#7C3AED",
        _ => "#6B7280",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn currency_uses_lakh_and_crore() {
        assert_eq!(format_currency(1_500_000.0), "₹15.0L");
        assert_eq!(format_currency(12_000_000.0), "₹1.2Cr");
        assert_eq!(format_currency(500.0), "₹500");
        assert_eq!(format_currency(100_000.0), "₹1.0L");
        assert_eq!(format_currency(99_999.0), "₹99,999");
        assert_eq!(format_currency(0.0), "₹0");
        assert_eq!(format_currency(-250_000.0), "-₹2.5L");
    }

    #[test]
    fn currency_tier_follows_the_rounded_value() {
        assert_eq!(format_currency(99_999.6), "₹1.0L");
        assert_eq!(format_currency(99_999.4), "₹99,999");
        assert_eq!(format_currency(9_999_999.0), "₹1.0Cr");
        assert_eq!(format_currency(9_994_000.0), "₹99.9L");
        assert_eq!(format_currency(-9_999_999.0), "-₹1.0Cr");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(group_indian(999), "999");
        assert_eq!(group_indian(1_000), "1,000");
        assert_eq!(group_indian(50_000), "50,000");
        assert_eq!(group_indian(1_234_567), "12,34,567");
        assert_eq!(group_indian(123_456_789), "12,34,56,789");
    }

    #[test]
    fn month_keys_sort_newest_first() {
        assert_eq!(
            sort_month_keys_desc(&["2024-01", "2024-12", "2023-06"]),
            vec!["2024-12", "2024-01", "2023-06"]
        );
        assert_eq!(
            sort_month_keys_desc(&["unknown", "2023-06", "2024-02"]),
            vec!["2024-02", "2023-06", "unknown"]
        );
    }

    #[test]
    fn month_and_date_labels() {
        assert_eq!(format_month_key("2024-12"), "Dec 2024");
        assert_eq!(format_month_key("later"), "later");
        let date = Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap();
        assert_eq!(format_date(&date), "5 Jan 2025");
    }

    #[test]
    fn status_colors() {
        assert_eq!(status_color("Paid"), "#16A34A");
        assert_eq!(status_color("in_progress"), "#F59E0B");
        assert_eq!(status_color("REJECTED"), "#DC2626");
        assert_eq!(status_color("on hold"), "#7C3AED");
        assert_eq!(status_color("mystery"), "#6B7280");
    }
}
