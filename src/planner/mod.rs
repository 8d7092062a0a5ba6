pub mod parser;
pub mod statement;
