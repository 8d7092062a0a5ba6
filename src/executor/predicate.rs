use std::cmp::Ordering;

use crate::{
    storage::schema::TableSchema,
    types::{
        error::{DatabaseError, Result},
        row::Row,
        value::Value,
    },
};

/// Comparison operators of the WHERE grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

/// A single-column filter: `column op literal`. Evaluation uses the column's
/// native type semantics: numeric comparison across Integer/Real, byte
/// lexicographic comparison for Text. A stored Null never matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: ComparisonOp,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: String, op: ComparisonOp, value: Value) -> Self {
        Self { column, op, value }
    }

    pub fn eq(column: String, value: Value) -> Self {
        Self::new(column, ComparisonOp::Equal, value)
    }

    pub fn ne(column: String, value: Value) -> Self {
        Self::new(column, ComparisonOp::NotEqual, value)
    }

    pub fn lt(column: String, value: Value) -> Self {
        Self::new(column, ComparisonOp::LessThan, value)
    }

    pub fn le(column: String, value: Value) -> Self {
        Self::new(column, ComparisonOp::LessThanOrEqual, value)
    }

    pub fn gt(column: String, value: Value) -> Self {
        Self::new(column, ComparisonOp::GreaterThan, value)
    }

    pub fn ge(column: String, value: Value) -> Self {
        Self::new(column, ComparisonOp::GreaterThanOrEqual, value)
    }

    /// Check the referenced column exists before any row is scanned.
    pub fn validate_against_schema(&self, schema: &TableSchema) -> Result<()> {
        if schema.column(&self.column).is_none() {
            return Err(DatabaseError::ColumnNotFound {
                name: self.column.clone(),
                table: schema.table_name.clone(),
            });
        }
        Ok(())
    }

    pub fn evaluate(&self, row: &Row, schema: &TableSchema) -> Result<bool> {
        let column_index =
            schema
                .column_index(&self.column)
                .ok_or_else(|| DatabaseError::ColumnNotFound {
                    name: self.column.clone(),
                    table: schema.table_name.clone(),
                })?;
        let row_value = row.get_value(column_index).ok_or_else(|| {
            DatabaseError::SerializationError {
                details: format!("row is missing column index {}", column_index),
            }
        })?;
        Ok(self.matches(row_value))
    }

    pub fn matches(&self, row_value: &Value) -> bool {
        if row_value.is_null() {
            return false;
        }
        match row_value.partial_cmp(&self.value) {
            Some(ordering) => match self.op {
                ComparisonOp::Equal => ordering == Ordering::Equal,
                ComparisonOp::NotEqual => ordering != Ordering::Equal,
                ComparisonOp::LessThan => ordering == Ordering::Less,
                ComparisonOp::LessThanOrEqual => ordering != Ordering::Greater,
                ComparisonOp::GreaterThan => ordering == Ordering::Greater,
                ComparisonOp::GreaterThanOrEqual => ordering != Ordering::Less,
            },
            // Incomparable operands (e.g. text against a numeric literal)
            None => self.op == ComparisonOp::NotEqual,
        }
    }
}
