//! Query parameters, placeholder binding and the free-text guard.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::error::DashboardError;

/// A value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamValue {
    Int(i64),
    IntList(Vec<i64>),
    Date(NaiveDate),
    Text(String),
}

/// Named query parameters. Ordered so that equal parameter sets hash and
/// compare equal regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryParams {
    values: BTreeMap<String, ParamValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: ParamValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn with_int(self, name: &str, value: i64) -> Self {
        self.with(name, ParamValue::Int(value))
    }

    pub fn with_ints(self, name: &str, values: &[i64]) -> Self {
        self.with(name, ParamValue::IntList(values.to_vec()))
    }

    pub fn with_date(self, name: &str, value: NaiveDate) -> Self {
        self.with(name, ParamValue::Date(value))
    }

    pub fn with_text(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, ParamValue::Text(value.into()))
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// SQL rewritten to positional placeholders with its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery<'a> {
    pub sql: String,
    pub args: Vec<&'a ParamValue>,
}

/// Rewrites `:name` placeholders to `$1..$n`.
///
/// `::type` casts and single-quoted literals are left alone. A name used
/// twice maps to the same position. Without parameters the text is passed
/// through untouched, so free-text SQL is never rewritten.
pub fn bind_named<'a>(
    sql: &str,
    params: &'a QueryParams,
) -> Result<BoundQuery<'a>, DashboardError> {
    if params.is_empty() {
        return Ok(BoundQuery {
            sql: sql.to_string(),
            args: Vec::new(),
        });
    }

    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut order: Vec<&str> = Vec::new();
    let mut args: Vec<&'a ParamValue> = Vec::new();
    let mut i = 0;
    let mut in_literal = false;

    while i < chars.len() {
        let c = chars[i];
        if in_literal {
            out.push(c);
            if c == '\'' {
                in_literal = false;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' => {
                in_literal = true;
                out.push(c);
                i += 1;
            }
            ':' if chars.get(i + 1) == Some(&':') => {
                out.push_str("::");
                i += 2;
            }
            ':' if chars
                .get(i + 1)
                .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') =>
            {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_')
                {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                let (key, value) = params
                    .values
                    .get_key_value(&name)
                    .ok_or_else(|| DashboardError::UnboundParameter { name: name.clone() })?;
                let position = match order.iter().position(|n| *n == key.as_str()) {
                    Some(p) => p + 1,
                    None => {
                        order.push(key.as_str());
                        args.push(value);
                        order.len()
                    }
                };
                out.push('$');
                out.push_str(&position.to_string());
                i = end;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    Ok(BoundQuery { sql: out, args })
}

/// Accepts free text only when it begins with SELECT, ignoring leading
/// whitespace and case. `SELECTED` passes too.
///
/// This is a lexical check, not an authorization layer; the database
/// adapter additionally runs every statement read-only.
pub fn is_select_statement(text: &str) -> bool {
    text.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}

/// Quotes a PostgreSQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn clamp_limit(value: Option<i64>, min: i64, max: i64, default: i64) -> i64 {
    value.unwrap_or(default).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn binds_in_order_of_appearance() {
        let params = QueryParams::new()
            .with_date("start_date", date(2024, 1, 1))
            .with_date("end_date", date(2024, 3, 31))
            .with_int("security_key", 7);
        let bound = bind_named(
            "WHERE ft.security_key = :security_key AND d.date BETWEEN :start_date AND :end_date",
            &params,
        )
        .unwrap();
        assert_eq!(
            bound.sql,
            "WHERE ft.security_key = $1 AND d.date BETWEEN $2 AND $3"
        );
        assert_eq!(bound.args[0], &ParamValue::Int(7));
        assert_eq!(bound.args[2], &ParamValue::Date(date(2024, 3, 31)));
    }

    #[test]
    fn casts_are_not_placeholders() {
        let params = QueryParams::new().with_ints("accounts", &[1, 2]);
        let bound = bind_named("account_key = ANY(:accounts::bigint[])", &params).unwrap();
        assert_eq!(bound.sql, "account_key = ANY($1::bigint[])");
        assert_eq!(bound.args.len(), 1);
    }

    #[test]
    fn repeated_name_reuses_position() {
        let params = QueryParams::new().with_text("table_name", "dim_trader");
        let bound = bind_named(
            "tc.table_name = :table_name OR c.table_name = :table_name",
            &params,
        )
        .unwrap();
        assert_eq!(bound.sql, "tc.table_name = $1 OR c.table_name = $1");
        assert_eq!(bound.args.len(), 1);
    }

    #[test]
    fn literals_are_skipped() {
        let params = QueryParams::new().with_int("limit", 5);
        let bound = bind_named("SELECT '10:30' AS t, x LIMIT :limit", &params).unwrap();
        assert_eq!(bound.sql, "SELECT '10:30' AS t, x LIMIT $1");
    }

    #[test]
    fn unbound_placeholder_is_an_error() {
        let params = QueryParams::new().with_int("limit", 5);
        let err = bind_named("SELECT :missing", &params).unwrap_err();
        assert!(matches!(err, DashboardError::UnboundParameter { name } if name == "missing"));
    }

    #[test]
    fn no_params_passes_text_through() {
        let params = QueryParams::new();
        let bound = bind_named("SELECT ':x'::text, :y", &params).unwrap();
        assert_eq!(bound.sql, "SELECT ':x'::text, :y");
        assert!(bound.args.is_empty());
    }

    #[test]
    fn params_equal_regardless_of_insertion_order() {
        let a = QueryParams::new().with_int("a", 1).with_int("b", 2);
        let b = QueryParams::new().with_int("b", 2).with_int("a", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn guard_accepts_select_variants() {
        assert!(is_select_statement("SELECT 1"));
        assert!(is_select_statement("select * from fact_trades"));
        assert!(is_select_statement("  \n\tSeLeCt now()"));
        assert!(is_select_statement("SELECTED"));
    }

    #[test]
    fn guard_rejects_everything_else() {
        assert!(!is_select_statement(""));
        assert!(!is_select_statement("   "));
        assert!(!is_select_statement("DELETE FROM fact_trades"));
        assert!(!is_select_statement("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(!is_select_statement("SELEC"));
        assert!(!is_select_statement("-- SELECT\nDROP TABLE dim_date"));
    }

    #[test]
    fn quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("dim_date"), "\"dim_date\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn clamp_limit_bounds_and_defaults() {
        assert_eq!(clamp_limit(None, 10, 1000, 100), 100);
        assert_eq!(clamp_limit(Some(5), 10, 1000, 100), 10);
        assert_eq!(clamp_limit(Some(5000), 10, 1000, 100), 1000);
        assert_eq!(clamp_limit(Some(250), 10, 1000, 100), 250);
    }

    proptest! {
        #[test]
        fn guard_accepts_any_select_prefix(ws in "[ \t\n]{0,4}", tail in "[ -~]{0,40}") {
            let text = format!("{ws}SeLeCt {tail}");
            prop_assert!(is_select_statement(&text));
        }

        #[test]
        fn guard_rejects_non_select_words(word in "[A-Za-z]{1,10}", tail in "[ -~]{0,20}") {
            prop_assume!(!word.to_ascii_lowercase().starts_with("select"));
            let text = format!("{word} {tail}");
            prop_assert!(!is_select_statement(&text));
        }
    }
}
