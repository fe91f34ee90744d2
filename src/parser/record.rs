use serde_json::{Map, Value};
use std::fmt;

use crate::schema::{ColumnType, TableSchema};

/// A parsed row ready for insertion, values in column order
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub values: Vec<SqlValue>,
}

impl ParsedRow {
    /// Human-readable rendering for error reports
    pub fn describe(&self, schema: &TableSchema) -> String {
        schema
            .columns
            .iter()
            .zip(&self.values)
            .map(|(col, value)| format!("{}={}", col.name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", r),
            SqlValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Parse one row object of a flat document section against its table.
///
/// Rows must carry exactly the table's columns; nullable columns may be
/// omitted.
pub fn parse_record(json: &Value, schema: &TableSchema) -> Result<ParsedRow, String> {
    let obj: &Map<String, Value> = json
        .as_object()
        .ok_or_else(|| format!("expected an object, found {}", kind_of(json)))?;

    if let Some(unknown) = obj.keys().find(|k| schema.column(k).is_none()) {
        return Err(format!("unknown column `{}`", unknown));
    }

    let mut values = Vec::with_capacity(schema.columns.len());
    for col in schema.columns {
        let value = extract_value(obj.get(col.name), col.col_type)
            .map_err(|e| format!("column `{}`: {}", col.name, e))?;
        if value == SqlValue::Null && !col.nullable {
            return Err(format!("column `{}` is required", col.name));
        }
        if let (SqlValue::Text(text), Some(allowed)) = (&value, col.allowed) {
            if !col.accepts(text) {
                return Err(format!(
                    "column `{}`: `{}` is not one of {}",
                    col.name,
                    text,
                    allowed.join(", ")
                ));
            }
        }
        values.push(value);
    }

    Ok(ParsedRow { values })
}

fn extract_value(val: Option<&Value>, col_type: ColumnType) -> Result<SqlValue, String> {
    let v = match val {
        None | Some(Value::Null) => return Ok(SqlValue::Null),
        Some(v) => v,
    };

    let parsed = match col_type {
        ColumnType::Integer => v.as_i64().map(SqlValue::Integer),
        ColumnType::Real => v.as_f64().map(SqlValue::Real),
        ColumnType::Text => v.as_str().map(|s| SqlValue::Text(s.to_string())),
        ColumnType::Boolean => match v {
            Value::Bool(b) => Some(SqlValue::Integer(i64::from(*b))),
            Value::Number(n) => match n.as_i64() {
                Some(i @ (0 | 1)) => Some(SqlValue::Integer(i)),
                _ => None,
            },
            _ => None,
        },
    };

    parsed.ok_or_else(|| {
        format!(
            "expected {}, found {}",
            col_type.sql_type().to_lowercase(),
            kind_of(v)
        )
    })
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{BODY_ORGANICS, RESOURCES, RESOURCE_RARITIES, SYSTEMS};
    use serde_json::json;

    #[test]
    fn test_values_follow_column_order() {
        let row = parse_record(&json!({"body_count": 2, "name": "Sol"}), &SYSTEMS).unwrap();
        assert_eq!(
            row.values,
            vec![SqlValue::Text("Sol".into()), SqlValue::Integer(2)]
        );
    }

    #[test]
    fn test_boolean_becomes_integer() {
        let row = parse_record(
            &json!({
                "system": "Sol", "body": "Earth", "organism": "Cow",
                "resource": "Meat", "domesticable": true
            }),
            &BODY_ORGANICS,
        )
        .unwrap();
        assert_eq!(row.values[4], SqlValue::Integer(1));
    }

    #[test]
    fn test_nullable_column_may_be_omitted() {
        let row = parse_record(
            &json!({
                "name": "Iron", "short_name": "Fe", "rarity": "common",
                "type": "inorganic", "mass": 0.9, "value": 5
            }),
            &RESOURCES,
        )
        .unwrap();
        assert_eq!(row.values[5], SqlValue::Real(5.0));
        assert_eq!(row.values[6], SqlValue::Null);
    }

    #[test]
    fn test_rejects_missing_required_column() {
        let err = parse_record(&json!({"name": "Sol"}), &SYSTEMS).unwrap_err();
        assert!(err.contains("body_count"));
    }

    #[test]
    fn test_rejects_unknown_column_and_wrong_type() {
        let err = parse_record(&json!({"name": "Sol", "body_count": 1, "star": "G"}), &SYSTEMS)
            .unwrap_err();
        assert!(err.contains("unknown column `star`"));

        let err = parse_record(&json!({"name": "Sol", "body_count": "two"}), &SYSTEMS).unwrap_err();
        assert!(err.contains("expected integer, found string"));
    }

    #[test]
    fn test_rejects_value_outside_closed_set() {
        let err = parse_record(&json!({"name": "legendary"}), &RESOURCE_RARITIES).unwrap_err();
        assert!(err.contains("`legendary` is not one of common, uncommon"));

        let err = parse_record(
            &json!({
                "name": "Zeta", "short_name": "Zt", "rarity": "rare",
                "type": "plasma", "mass": 1, "value": 1
            }),
            &RESOURCES,
        )
        .unwrap_err();
        assert!(err.contains("column `type`"));

        assert!(parse_record(&json!({"name": "exotic"}), &RESOURCE_RARITIES).is_ok());
    }
}
