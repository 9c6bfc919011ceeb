//! Small display helpers for cell and status line text.

use chrono::NaiveDate;

/// Groups the digits of a count with commas: 1234567 -> "1,234,567".
pub fn thousands(n: usize) -> String {
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

/// Renders a numeric value as a currency amount with two decimals.
pub fn currency(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;
    let sign = if negative { "-" } else { "" };
    format!("{}${}.{:02}", sign, thousands(whole as usize), frac)
}

/// Reformats an ISO `YYYY-MM-DD` cell as e.g. "12 Mar 2020".
/// Returns None when the cell does not parse as a date.
pub fn date(iso: &str) -> Option<String> {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%d %b %Y").to_string())
}
