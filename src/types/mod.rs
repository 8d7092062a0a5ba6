pub mod error;
pub mod row;
pub mod value;

// Fixed-width slot sizes shared by the schema catalog and the row codec
pub const INTEGER_SIZE: usize = 8;
pub const REAL_SIZE: usize = 8;
pub const NULL_FLAG_SIZE: usize = 1; // presence byte ahead of a nullable slot
pub const DEFAULT_TEXT_WIDTH: usize = 64;
