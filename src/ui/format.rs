//! Number formatting for table cells.

const SCALE: f64 = 1000.0;
const SUFFIXES: [&str; 6] = ["K", "M", "G", "T", "P", "E"];

/// Format a count with a metric suffix (e.g., 1234 -> "1.2K", 5_600_000_000 -> "5.6G").
pub fn format_count(n: u64) -> String {
    if (n as f64) < SCALE {
        return n.to_string();
    }

    let mut value = n as f64;
    let mut suffix = "";
    for next in SUFFIXES {
        if value < SCALE {
            break;
        }
        value /= SCALE;
        suffix = next;
    }
    format!("{:.1}{}", value, suffix)
}

/// Format a percentage, or "-" when the broker reported a zero total.
pub fn format_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value)
    } else {
        "-".to_string()
    }
}

/// Format a message rate.
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}/s", rate)
}

/// Format a signed difference of rates with an explicit sign.
pub fn format_signed_rate(rate: f64) -> String {
    format!("{:+.1}/s", rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(1_500_000), "1.5M");
        assert_eq!(format_count(5_600_000_000), "5.6G");
        assert_eq!(format_count(2_000_000_000_000), "2.0T");
        assert_eq!(format_count(3_000_000_000_000_000), "3.0P");
        assert_eq!(format_count(u64::MAX), "18.4E");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(8.5), "8.50%");
        assert_eq!(format_pct(f64::NAN), "-");
        assert_eq!(format_pct(f64::INFINITY), "-");
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_rate(2.34), "2.3/s");
        assert_eq!(format_signed_rate(15.0), "+15.0/s");
        assert_eq!(format_signed_rate(-3.0), "-3.0/s");
    }
}
