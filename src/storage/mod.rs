pub mod codec;
pub mod database;
pub mod header;
pub mod schema;
pub mod table;

pub const TABLE_MAGIC: &[u8; 8] = b"KOPITBL\0";
pub const TABLE_FORMAT_VERSION: u32 = 1;
pub const TABLE_HEADER_SIZE: usize = 512;
pub const MAX_COLUMNS: usize = 16;
pub const MAX_COLUMN_NAME: usize = 15;
pub const MAX_TABLE_NAME: usize = 31;

pub const DATABASE_MAGIC: &[u8; 8] = b"KOPIDB\0\0";
pub const DATABASE_FORMAT_VERSION: u32 = 1;

pub const INITIAL_FILE_SIZE: usize = 1024 * 1024;
pub const GROWTH_FACTOR: usize = 2;
pub const SYNC_INTERVAL_ROWS: u64 = 512;

/// Byte-order tag recorded in file headers, for forward diagnosis only.
pub const BYTE_ORDER_LITTLE: u8 = 1;
pub const BYTE_ORDER_BIG: u8 = 2;

pub fn native_byte_order() -> u8 {
    if cfg!(target_endian = "little") {
        BYTE_ORDER_LITTLE
    } else {
        BYTE_ORDER_BIG
    }
}
