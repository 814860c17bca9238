//! Result rendering for front ends
//!
//! Renders a [`QueryResult`] or an [`Error`] either as an ASCII table or as a
//! single line of JSON.

use crate::error::Error;
use crate::executor::QueryResult;
use crate::storage::Row;

/// Output mode of a front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    /// Parse a `.mode` argument
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Format a statement result
pub fn format_result(result: &QueryResult, format: OutputFormat) -> String {
    if let Some(ref msg) = result.message {
        if format == OutputFormat::Json {
            return serde_json::json!({
                "status": "success",
                "message": msg,
                "affected_rows": result.affected_rows
            })
            .to_string()
                + "\n";
        }
        return format!("{}\n", msg);
    }

    if format == OutputFormat::Json {
        return serde_json::json!({
            "status": "success",
            "columns": result.columns,
            "rows": result.rows
        })
        .to_string()
            + "\n";
    }

    format_table(&result.columns, &result.rows)
}

/// Format an error, tagged with its kind in JSON mode
pub fn format_error(err: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::json!({
                "status": "error",
                "error_type": err.kind().as_str(),
                "message": err.to_string()
            })
            .to_string()
                + "\n"
        }
        OutputFormat::Table => format!("Error: {}\n", err),
    }
}

fn format_table(columns: &[String], rows: &[Row]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, value) in row.values().iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(value.to_string().chars().count());
            }
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    let mut output = String::new();
    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    for row in rows {
        let line: String = row
            .values()
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!(" {:>width$} ", v.to_string(), width = *w))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", line));
    }
    if !rows.is_empty() {
        output.push_str(&separator);
    }

    output.push_str(&format!("{} row(s) returned\n", rows.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Value;

    fn sample() -> QueryResult {
        QueryResult::with_rows(
            vec!["id".to_string(), "name".to_string()],
            vec![Row::new(vec![Value::Integer(1), Value::from("Ann")])],
        )
    }

    #[test]
    fn test_table_format() {
        let out = format_result(&sample(), OutputFormat::Table);
        let expected = "\
+----+------+
| id | name |
+----+------+
|  1 |  Ann |
+----+------+
1 row(s) returned
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_json_format() {
        let out = format_result(&sample(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["columns"], serde_json::json!(["id", "name"]));
        assert_eq!(parsed["rows"], serde_json::json!([[1, "Ann"]]));

        let out = format_result(
            &QueryResult::with_affected_rows(2, "2 row(s) deleted"),
            OutputFormat::Json,
        );
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["affected_rows"], 2);
        assert_eq!(parsed["message"], "2 row(s) deleted");
    }

    #[test]
    fn test_error_format() {
        let err = Error::TableNotFound("t".to_string());
        assert_eq!(
            format_error(&err, OutputFormat::Table),
            "Error: Catalog error: table 't' not found\n"
        );

        let parsed: serde_json::Value =
            serde_json::from_str(&format_error(&err, OutputFormat::Json)).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["error_type"], "table_not_found");
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(OutputFormat::from_name("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_name("csv"), None);
    }
}
