use serde::{Deserialize, Serialize};

use crate::types::value::Value;

/// A general-path row: an ordered tuple of values with no fixed width.
/// Persisted through the catalog file's bincode payload, unlike the
/// fast-path codec which packs against a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get_value(&self, column_index: usize) -> Option<&Value> {
        self.values.get(column_index)
    }
}
