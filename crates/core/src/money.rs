/// Format an amount as US dollars with thousands separators, e.g. `$1,234.50`.
///
/// Non-finite input renders as `$0.00`.
pub fn format_usd(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// One decimal place followed by `%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_two_decimals() {
        assert_eq!(format_usd(12.5), "$12.50");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(25.99), "$25.99");
    }

    #[test]
    fn usd_thousands_separator() {
        assert_eq!(format_usd(1234.56), "$1,234.56");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_usd(999.0), "$999.00");
    }

    #[test]
    fn usd_negative_and_non_finite() {
        assert_eq!(format_usd(-1.0), "-$1.00");
        assert_eq!(format_usd(f64::NAN), "$0.00");
    }

    #[test]
    fn percent_one_decimal() {
        assert_eq!(format_percent(8.336), "8.3%");
        assert_eq!(format_percent(0.0), "0.0%");
    }
}
