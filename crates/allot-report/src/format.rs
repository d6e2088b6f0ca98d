/// Two decimals with comma thousands separators, e.g. `1,234,567.89`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" reads as noise
    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// `part` as a percentage of `whole`, 0 when `whole` is not positive.
pub(crate) fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part * 100.0 / whole
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(1_000.0), "1,000.00");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(100_000.0), "100,000.00");
    }

    #[test]
    fn keeps_sign_only_when_visible() {
        assert_eq!(format_amount(-2_500.0), "-2,500.00");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn percent_handles_zero_whole() {
        assert_eq!(percent_of(50.0, 200.0), 25.0);
        assert_eq!(percent_of(50.0, 0.0), 0.0);
    }
}
