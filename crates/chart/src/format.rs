use chrono::NaiveDate;

/// Compact currency label for chart axes.
///
/// Amounts from a thousand upward get a K/M/B suffix with one decimal; smaller
/// amounts are whole dollars.
pub fn format_currency(amount: f64) -> String {
    if amount >= 1_000_000_000.0 {
        format!("${:.1}B", amount / 1_000_000_000.0)
    } else if amount >= 1_000_000.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("${:.1}K", amount / 1_000.0)
    } else {
        whole_dollars(amount)
    }
}

/// `$1,234` style, rounded to the nearest dollar.
pub fn whole_dollars(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}", sign, grouped)
}

/// "Mon D", e.g. `Mar 5`.
pub fn format_axis_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_amounts_use_suffixes() {
        assert_eq!(format_currency(1_500.0), "$1.5K");
        assert_eq!(format_currency(2_345_678.0), "$2.3M");
        assert_eq!(format_currency(7_000_000_000.0), "$7.0B");
    }

    #[test]
    fn small_amounts_are_whole_dollars() {
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(-12.6), "-$13");
        assert_eq!(whole_dollars(-1_234_567.0), "-$1,234,567");
    }

    #[test]
    fn axis_dates_drop_the_leading_zero() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_axis_date(date), "Mar 5");
    }
}
