//! Display formatting for metrics and tables.

use super::table::Value;

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn grouped(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let mut out = group_thousands(int_part);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

fn rounds_to_zero(value: f64, decimals: usize) -> bool {
    format!("{:.*}", decimals, value.abs())
        .chars()
        .all(|c| c == '0' || c == '.')
}

/// `$1,234` / `-$1,234.50`.
pub fn money(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }
    let sign = if value < 0.0 && !rounds_to_zero(value, decimals) {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", grouped(value, decimals))
}

pub fn count(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&value.unsigned_abs().to_string()))
}

pub fn ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "0.00".to_string()
    }
}

/// Millions shorthand used as a metric delta; zero stays `0`.
pub fn millions_delta(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        "0".to_string()
    } else {
        format!("{:.1}M", value / 1_000_000.0)
    }
}

/// Per-column display rule for result tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    Money0,
    Money2,
    Ratio2,
    Count,
    Plain,
}

impl ColumnFormat {
    pub fn apply(self, value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        match (self, value.as_f64()) {
            (ColumnFormat::Money0, Some(v)) => money(v, 0),
            (ColumnFormat::Money2, Some(v)) => money(v, 2),
            (ColumnFormat::Ratio2, Some(v)) => ratio(v),
            (ColumnFormat::Count, Some(_)) => value.as_i64().map(count).unwrap_or_else(|| value.to_string()),
            _ => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(1_234_567.0, 0), "$1,234,567");
        assert_eq!(money(999.0, 0), "$999");
        assert_eq!(money(1000.0, 0), "$1,000");
        assert_eq!(money(1234.5, 2), "$1,234.50");
    }

    #[test]
    fn money_negative_sign_leads() {
        assert_eq!(money(-1234.5, 2), "-$1,234.50");
        assert_eq!(money(-0.001, 0), "$0");
    }

    #[test]
    fn money_non_finite_defaults_to_zero() {
        assert_eq!(money(f64::NAN, 0), "$0");
    }

    #[test]
    fn count_groups_thousands() {
        assert_eq!(count(961_100), "961,100");
        assert_eq!(count(0), "0");
        assert_eq!(count(-12_000), "-12,000");
    }

    #[test]
    fn millions_delta_matches_metric_style() {
        assert_eq!(millions_delta(0.0), "0");
        assert_eq!(millions_delta(2_350_000.0), "2.4M");
        assert_eq!(millions_delta(-500_000.0), "-0.5M");
    }

    #[test]
    fn column_formats_apply_to_numbers_only() {
        assert_eq!(ColumnFormat::Money0.apply(&Value::Float(12345.6)), "$12,346");
        assert_eq!(ColumnFormat::Ratio2.apply(&Value::Float(1.23456)), "1.23");
        assert_eq!(ColumnFormat::Count.apply(&Value::Int(4200)), "4,200");
        assert_eq!(ColumnFormat::Money2.apply(&Value::Text("n/a".into())), "n/a");
        assert_eq!(ColumnFormat::Money2.apply(&Value::Null), "");
    }
}
