//! CSV serialization of result tables.

use std::io::Write;

use crate::domain::error::DashboardError;
use crate::domain::table::ResultTable;

/// Header row, then one record per row. Nulls become empty fields.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<(), DashboardError> {
    if table.columns.is_empty() {
        return Ok(());
    }
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_bytes(table: &ResultTable) -> Result<Vec<u8>, DashboardError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Value;
    use chrono::NaiveDate;

    #[test]
    fn writes_header_and_rows() {
        let table = ResultTable::new(
            vec!["account_name".into(), "total_pnl".into(), "opened".into()],
            vec![
                vec![
                    Value::Text("Growth, Inc".into()),
                    Value::Float(12.5),
                    Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
                ],
                vec![Value::Text("Macro".into()), Value::Null, Value::Null],
            ],
        );
        let text = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        assert_eq!(
            text,
            "account_name,total_pnl,opened\n\"Growth, Inc\",12.5,2024-01-02\nMacro,,\n"
        );
    }

    #[test]
    fn empty_table_with_columns_is_header_only() {
        let table = ResultTable::new(vec!["a".into(), "b".into()], Vec::new());
        assert_eq!(to_csv_bytes(&table).unwrap(), b"a,b\n");
    }

    #[test]
    fn table_without_columns_is_empty_output() {
        assert!(to_csv_bytes(&ResultTable::empty()).unwrap().is_empty());
    }
}
