use serde::{Deserialize, Serialize};

use crate::types::{
    DEFAULT_TEXT_WIDTH, INTEGER_SIZE, NULL_FLAG_SIZE, REAL_SIZE,
    error::{DatabaseError, Result},
    value::{DataType, Value},
};

/// One column of a table: name, type tag, value-slot width in bytes and an
/// optional NULLABLE wrapper. Column order is fixed at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
    pub width: usize,
    pub nullable: bool,
}

impl ColumnSchema {
    pub fn integer(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: DataType::Integer,
            width: INTEGER_SIZE,
            nullable: false,
        }
    }

    pub fn real(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: DataType::Real,
            width: REAL_SIZE,
            nullable: false,
        }
    }

    pub fn text(name: &str, width: usize) -> Self {
        Self {
            name: name.to_string(),
            data_type: DataType::Text,
            width,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Total fixed footprint of this column within a row, presence byte
    /// included.
    pub fn fixed_size(&self) -> usize {
        if self.nullable {
            NULL_FLAG_SIZE + self.width
        } else {
            self.width
        }
    }
}

/// Ordered column descriptors plus the computed fixed row width. The row
/// width is constant for the lifetime of a table; there is no migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
    pub row_width: usize,
}

impl TableSchema {
    pub fn new(table_name: String, columns: Vec<ColumnSchema>) -> Self {
        let row_width = columns.iter().map(|col| col.fixed_size()).sum();
        Self {
            table_name,
            columns,
            row_width,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|col| col.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    /// Validate a value tuple against this schema: value count, type tags
    /// (no implicit Integer/Real coercion), declared text capacity and
    /// nullability. Shared by the fixed-width codec and the general-path
    /// INSERT.
    pub fn validate_values(&self, values: &[Value]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(DatabaseError::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(values) {
            match value {
                Value::Null => {
                    if !column.nullable {
                        return Err(DatabaseError::NullViolation {
                            column: column.name.clone(),
                        });
                    }
                }
                Value::Text(s) => {
                    if column.data_type != DataType::Text {
                        return Err(type_mismatch(column, value));
                    }
                    if s.len() > column.width {
                        return Err(DatabaseError::TextOverflow {
                            column: column.name.clone(),
                            capacity: column.width,
                            length: s.len(),
                        });
                    }
                }
                Value::Integer(_) => {
                    if column.data_type != DataType::Integer {
                        return Err(type_mismatch(column, value));
                    }
                }
                Value::Real(_) => {
                    if column.data_type != DataType::Real {
                        return Err(type_mismatch(column, value));
                    }
                }
            }
        }
        Ok(())
    }
}

fn type_mismatch(column: &ColumnSchema, value: &Value) -> DatabaseError {
    DatabaseError::TypeMismatch {
        column: column.name.clone(),
        expected: column.data_type.to_string(),
        actual: value.data_type().to_string(),
    }
}

/// Parse `CREATE TABLE <name> ( <col> <type>[(<width>)], ... )` into a
/// schema. Keywords are case-insensitive, column names case-sensitive.
/// Recognized types: INTEGER, REAL, TEXT, TEXT(n), each optionally preceded
/// by the NULLABLE wrapper keyword.
pub fn parse_create_table(sql: &str) -> Result<TableSchema> {
    let sql = sql.trim().trim_end_matches(';').trim();
    let open = sql
        .find('(')
        .ok_or_else(|| parse_error("missing column list"))?;
    let close = sql
        .rfind(')')
        .ok_or_else(|| parse_error("missing closing parenthesis"))?;
    if close < open || !sql[close + 1..].trim().is_empty() {
        return Err(parse_error("malformed column list"));
    }

    let head: Vec<&str> = sql[..open].split_whitespace().collect();
    if head.len() != 3
        || !head[0].eq_ignore_ascii_case("CREATE")
        || !head[1].eq_ignore_ascii_case("TABLE")
    {
        return Err(parse_error("expected CREATE TABLE <name> (...)"));
    }
    let table_name = head[2];
    if table_name.is_empty() || !is_identifier(table_name) {
        return Err(parse_error(&format!("invalid table name '{}'", table_name)));
    }

    let body = sql[open + 1..close].trim();
    if body.is_empty() {
        return Err(parse_error("empty column list"));
    }

    let mut columns: Vec<ColumnSchema> = Vec::new();
    for col_def in body.split(',') {
        let column = parse_column_def(col_def)?;
        if columns.iter().any(|existing| existing.name == column.name) {
            return Err(DatabaseError::DuplicateColumn {
                name: column.name,
            });
        }
        columns.push(column);
    }

    Ok(TableSchema::new(table_name.to_string(), columns))
}

fn parse_column_def(col_def: &str) -> Result<ColumnSchema> {
    let tokens: Vec<&str> = col_def.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(parse_error(&format!(
            "incomplete column definition '{}'",
            col_def.trim()
        )));
    }
    let name = tokens[0];
    if !is_identifier(name) {
        return Err(parse_error(&format!("invalid column name '{}'", name)));
    }

    let mut index = 1;
    let mut nullable = false;
    if tokens[index].eq_ignore_ascii_case("NULLABLE") {
        nullable = true;
        index += 1;
    }
    let type_token = tokens
        .get(index)
        .ok_or_else(|| parse_error(&format!("missing type for column '{}'", name)))?;
    if tokens.len() > index + 1 {
        return Err(parse_error(&format!(
            "unexpected tokens after type in column '{}'",
            name
        )));
    }

    let (data_type, width) = parse_type_token(type_token)?;
    Ok(ColumnSchema {
        name: name.to_string(),
        data_type,
        width,
        nullable,
    })
}

fn parse_type_token(token: &str) -> Result<(DataType, usize)> {
    let upper = token.to_ascii_uppercase();
    if upper == "INTEGER" {
        return Ok((DataType::Integer, INTEGER_SIZE));
    }
    if upper == "REAL" {
        return Ok((DataType::Real, REAL_SIZE));
    }
    if upper == "TEXT" {
        return Ok((DataType::Text, DEFAULT_TEXT_WIDTH));
    }
    if let Some(rest) = upper.strip_prefix("TEXT(") {
        let digits = rest
            .strip_suffix(')')
            .ok_or_else(|| parse_error(&format!("malformed type '{}'", token)))?;
        let width: i64 = digits
            .trim()
            .parse()
            .map_err(|_| parse_error(&format!("invalid text width '{}'", digits)))?;
        if width <= 0 {
            return Err(parse_error(&format!(
                "text width must be positive, got {}",
                width
            )));
        }
        if width > u16::MAX as i64 {
            return Err(parse_error(&format!("text width {} too large", width)));
        }
        return Ok((DataType::Text, width as usize));
    }
    Err(parse_error(&format!("unknown type '{}'", token)))
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_error(details: &str) -> DatabaseError {
    DatabaseError::SqlParseError {
        details: details.to_string(),
    }
}
