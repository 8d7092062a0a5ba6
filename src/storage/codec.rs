use crate::{
    storage::schema::TableSchema,
    types::{
        error::{DatabaseError, Result},
        value::Value,
    },
};

/// Encode a value tuple into a fixed-width record laid out per the schema.
/// Pure function of schema and values; all validation happens before any
/// byte is produced, so a failed encode has no observable effect.
///
/// Layout per column: an optional one-byte presence flag (nullable columns
/// only) followed by the value slot. Integers and reals are 8 bytes in native
/// byte order; text is zero-filled to its declared capacity.
pub fn encode_row(schema: &TableSchema, values: &[Value]) -> Result<Vec<u8>> {
    schema.validate_values(values)?;

    let mut buffer = vec![0u8; schema.row_width];
    let mut offset = 0;
    for (column, value) in schema.columns.iter().zip(values) {
        if column.nullable {
            buffer[offset] = if value.is_null() { 0 } else { 1 };
            offset += 1;
        }
        match value {
            // Slot bytes stay zeroed by convention; decode never trusts them.
            Value::Null => {}
            Value::Integer(i) => {
                buffer[offset..offset + 8].copy_from_slice(&i.to_ne_bytes());
            }
            Value::Real(r) => {
                buffer[offset..offset + 8].copy_from_slice(&r.to_ne_bytes());
            }
            Value::Text(s) => {
                buffer[offset..offset + s.len()].copy_from_slice(s.as_bytes());
            }
        }
        offset += column.width;
    }
    Ok(buffer)
}

/// Decode one fixed-width record back into values. Text is reconstructed by
/// trimming trailing zero fill; no terminator byte is required. A nullable
/// column whose presence flag is 0 decodes to Null without interpreting the
/// slot bytes.
pub fn decode_row(schema: &TableSchema, buffer: &[u8]) -> Result<Vec<Value>> {
    if buffer.len() < schema.row_width {
        return Err(DatabaseError::SerializationError {
            details: format!(
                "row buffer of {} bytes is shorter than row width {}",
                buffer.len(),
                schema.row_width
            ),
        });
    }

    let mut values = Vec::with_capacity(schema.columns.len());
    let mut offset = 0;
    for column in &schema.columns {
        let mut present = true;
        if column.nullable {
            present = buffer[offset] != 0;
            offset += 1;
        }
        if !present {
            values.push(Value::Null);
            offset += column.width;
            continue;
        }
        let slot = &buffer[offset..offset + column.width];
        let value = match column.data_type {
            crate::types::value::DataType::Integer => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(slot);
                Value::Integer(i64::from_ne_bytes(raw))
            }
            crate::types::value::DataType::Real => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(slot);
                Value::Real(f64::from_ne_bytes(raw))
            }
            crate::types::value::DataType::Text => {
                let end = slot
                    .iter()
                    .rposition(|&b| b != 0)
                    .map(|pos| pos + 1)
                    .unwrap_or(0);
                let text = std::str::from_utf8(&slot[..end]).map_err(|_| {
                    DatabaseError::SerializationError {
                        details: format!("column '{}' holds invalid UTF-8", column.name),
                    }
                })?;
                Value::Text(text.to_string())
            }
            crate::types::value::DataType::Null => {
                return Err(DatabaseError::SerializationError {
                    details: format!("column '{}' declared with NULL type", column.name),
                });
            }
        };
        values.push(value);
        offset += column.width;
    }
    Ok(values)
}
