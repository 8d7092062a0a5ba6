use crc32fast::Hasher;

use crate::{
    storage::{
        MAX_COLUMN_NAME, MAX_COLUMNS, MAX_TABLE_NAME, TABLE_FORMAT_VERSION, TABLE_HEADER_SIZE,
        TABLE_MAGIC, native_byte_order,
        schema::{ColumnSchema, TableSchema},
    },
    types::{
        error::{DatabaseError, Result},
        value::DataType,
    },
};

// Fixed header layout. The schema region [0, CHECKSUM_OFFSET) is written once
// at create time and covered by the checksum; the row count lives outside it
// so appends never invalidate the checksum.
const NAME_SLOT_OFFSET: usize = 24;
const NAME_SLOT_SIZE: usize = 32;
const COLUMNS_OFFSET: usize = 56;
const COLUMN_SLOT_SIZE: usize = 24;
pub const CHECKSUM_OFFSET: usize = 440;
pub const ROW_COUNT_OFFSET: usize = 448;

const TYPE_TAG_INTEGER: u8 = 1;
const TYPE_TAG_REAL: u8 = 2;
const TYPE_TAG_TEXT: u8 = 3;

/// Fast-path table file header: magic tag, format version, byte-order tag,
/// row width, column descriptors and the persisted row count.
#[derive(Debug, Clone, PartialEq)]
pub struct TableHeader {
    pub version: u32,
    pub byte_order: u8,
    pub schema: TableSchema,
    pub row_count: u64,
}

impl TableHeader {
    /// Build a fresh header for a newly created table. Fails if the schema
    /// does not fit the fixed-size descriptor slots.
    pub fn new(schema: TableSchema) -> Result<Self> {
        if schema.columns.len() > MAX_COLUMNS {
            return Err(DatabaseError::InvalidHeader {
                reason: format!(
                    "table '{}' has {} columns, header supports at most {}",
                    schema.table_name,
                    schema.columns.len(),
                    MAX_COLUMNS
                ),
            });
        }
        if schema.table_name.len() > MAX_TABLE_NAME {
            return Err(DatabaseError::InvalidHeader {
                reason: format!("table name '{}' exceeds {} bytes", schema.table_name, MAX_TABLE_NAME),
            });
        }
        for column in &schema.columns {
            if column.name.len() > MAX_COLUMN_NAME {
                return Err(DatabaseError::InvalidHeader {
                    reason: format!("column name '{}' exceeds {} bytes", column.name, MAX_COLUMN_NAME),
                });
            }
        }
        Ok(Self {
            version: TABLE_FORMAT_VERSION,
            byte_order: native_byte_order(),
            schema,
            row_count: 0,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = vec![0u8; TABLE_HEADER_SIZE];

        buffer[0..8].copy_from_slice(TABLE_MAGIC);
        buffer[8..12].copy_from_slice(&self.version.to_le_bytes());
        buffer[12] = self.byte_order;
        buffer[16..20].copy_from_slice(&(self.schema.row_width as u32).to_le_bytes());
        buffer[20..24].copy_from_slice(&(self.schema.columns.len() as u32).to_le_bytes());

        let name = self.schema.table_name.as_bytes();
        buffer[NAME_SLOT_OFFSET] = name.len() as u8;
        buffer[NAME_SLOT_OFFSET + 1..NAME_SLOT_OFFSET + 1 + name.len()].copy_from_slice(name);

        for (i, column) in self.schema.columns.iter().enumerate() {
            let base = COLUMNS_OFFSET + i * COLUMN_SLOT_SIZE;
            let col_name = column.name.as_bytes();
            buffer[base] = col_name.len() as u8;
            buffer[base + 1..base + 1 + col_name.len()].copy_from_slice(col_name);
            buffer[base + 16] = type_tag(column.data_type);
            buffer[base + 17] = if column.nullable { 1 } else { 0 };
            buffer[base + 18..base + 20].copy_from_slice(&(column.width as u16).to_le_bytes());
        }

        let checksum = schema_checksum(&buffer[..CHECKSUM_OFFSET]);
        buffer[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());
        buffer[ROW_COUNT_OFFSET..ROW_COUNT_OFFSET + 8]
            .copy_from_slice(&self.row_count.to_le_bytes());

        buffer
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < TABLE_HEADER_SIZE {
            return Err(DatabaseError::InvalidHeader {
                reason: "header too short".to_string(),
            });
        }
        if &bytes[0..8] != TABLE_MAGIC {
            return Err(DatabaseError::InvalidHeader {
                reason: "unrecognized magic tag".to_string(),
            });
        }
        let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        if version != TABLE_FORMAT_VERSION {
            return Err(DatabaseError::InvalidHeader {
                reason: format!("unsupported format version {}", version),
            });
        }
        let byte_order = bytes[12];
        if byte_order != native_byte_order() {
            // Row payloads use the writer's native order; refuse rather than
            // misread on a foreign-endian host.
            return Err(DatabaseError::InvalidHeader {
                reason: format!(
                    "file written with byte-order tag {}, host uses {}",
                    byte_order,
                    native_byte_order()
                ),
            });
        }

        let stored_checksum = u32::from_le_bytes([
            bytes[CHECKSUM_OFFSET],
            bytes[CHECKSUM_OFFSET + 1],
            bytes[CHECKSUM_OFFSET + 2],
            bytes[CHECKSUM_OFFSET + 3],
        ]);
        let computed = schema_checksum(&bytes[..CHECKSUM_OFFSET]);
        if stored_checksum != computed {
            return Err(DatabaseError::InvalidHeader {
                reason: "schema checksum mismatch".to_string(),
            });
        }

        let row_width = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]) as usize;
        let column_count =
            u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]) as usize;
        if column_count == 0 || column_count > MAX_COLUMNS {
            return Err(DatabaseError::InvalidHeader {
                reason: format!("invalid column count {}", column_count),
            });
        }

        let table_name = read_name(&bytes[NAME_SLOT_OFFSET..NAME_SLOT_OFFSET + NAME_SLOT_SIZE])?;

        let mut columns = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let base = COLUMNS_OFFSET + i * COLUMN_SLOT_SIZE;
            let name = read_name(&bytes[base..base + 16])?;
            let data_type = data_type_from_tag(bytes[base + 16])?;
            let nullable = bytes[base + 17] != 0;
            let width = u16::from_le_bytes([bytes[base + 18], bytes[base + 19]]) as usize;
            columns.push(ColumnSchema {
                name,
                data_type,
                width,
                nullable,
            });
        }

        let schema = TableSchema::new(table_name, columns);
        if schema.row_width != row_width {
            return Err(DatabaseError::InvalidHeader {
                reason: format!(
                    "declared row width {} does not match schema width {}",
                    row_width, schema.row_width
                ),
            });
        }

        let row_count = u64::from_le_bytes([
            bytes[ROW_COUNT_OFFSET],
            bytes[ROW_COUNT_OFFSET + 1],
            bytes[ROW_COUNT_OFFSET + 2],
            bytes[ROW_COUNT_OFFSET + 3],
            bytes[ROW_COUNT_OFFSET + 4],
            bytes[ROW_COUNT_OFFSET + 5],
            bytes[ROW_COUNT_OFFSET + 6],
            bytes[ROW_COUNT_OFFSET + 7],
        ]);

        Ok(Self {
            version,
            byte_order,
            schema,
            row_count,
        })
    }
}

fn schema_checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

fn read_name(slot: &[u8]) -> Result<String> {
    let len = slot[0] as usize;
    if len >= slot.len() {
        return Err(DatabaseError::InvalidHeader {
            reason: format!("name length {} overflows its slot", len),
        });
    }
    String::from_utf8(slot[1..1 + len].to_vec()).map_err(|_| DatabaseError::InvalidHeader {
        reason: "name is not valid UTF-8".to_string(),
    })
}

fn type_tag(data_type: DataType) -> u8 {
    match data_type {
        DataType::Integer => TYPE_TAG_INTEGER,
        DataType::Real => TYPE_TAG_REAL,
        DataType::Text => TYPE_TAG_TEXT,
        // Null is a value state, never a declared column type
        DataType::Null => 0,
    }
}

fn data_type_from_tag(tag: u8) -> Result<DataType> {
    match tag {
        TYPE_TAG_INTEGER => Ok(DataType::Integer),
        TYPE_TAG_REAL => Ok(DataType::Real),
        TYPE_TAG_TEXT => Ok(DataType::Text),
        other => Err(DatabaseError::InvalidHeader {
            reason: format!("unknown column type tag {}", other),
        }),
    }
}
