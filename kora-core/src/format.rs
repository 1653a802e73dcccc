//! Display formatting shared by every adapter.
//!
//! Placeholders follow the report page: a missing value renders as "-".

use crate::domain::price::parse_day;
use crate::indicators::round_half_up;

pub const PLACEHOLDER: &str = "-";

/// Group an integer with thousands separators: `1234567 → "1,234,567"`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `41250 → "41,250원"`. Zero and missing values render as the placeholder.
pub fn format_price(price: Option<f64>) -> String {
    match price.filter(|p| p.is_finite() && *p != 0.0) {
        Some(p) => format!("{}원", group_thousands(round_half_up(p) as i64)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Signed percentage with two decimals: `1.5 → "+1.50%"`.
pub fn format_change(rate: f64) -> String {
    if rate >= 0.0 {
        format!("+{rate:.2}%")
    } else {
        format!("{rate:.2}%")
    }
}

/// Value with a unit suffix, e.g. PER `"12.3배"`. Zero counts as missing.
pub fn format_with_unit(value: Option<f64>, unit: &str) -> String {
    match value.filter(|v| v.is_finite() && *v != 0.0) {
        Some(v) => format!("{}{unit}", trim_number(v)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Ratio value with two decimals and a unit: `"152.30%"`.
pub fn format_ratio(value: f64, unit: &str) -> String {
    format!("{value:.2}{unit}")
}

/// Amount in won converted to 억 (1e8) and grouped: `1.5e12 → "15,000"`.
pub fn format_eok(amount: Option<f64>) -> String {
    match amount.filter(|a| a.is_finite() && *a != 0.0) {
        Some(a) => group_thousands(round_half_up(a / 100_000_000.0) as i64),
        None => PLACEHOLDER.to_string(),
    }
}

/// Normalize backend dates: `YYYYMMDD` and timestamps become `YYYY-MM-DD`.
/// Strings that are not dates are returned unchanged.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    match parse_day(raw) {
        Some(day) => day.format("%Y-%m-%d").to_string(),
        None => raw.split('T').next().unwrap_or(raw).to_string(),
    }
}

/// Text or the placeholder when absent or blank.
pub fn text_or_placeholder(text: Option<&str>) -> String {
    text.map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

fn trim_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
