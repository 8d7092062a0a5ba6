use crate::{
    executor::predicate::Predicate, storage::schema::TableSchema, types::value::Value,
};

/// Column selection of a SELECT: `*` or an explicit name list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

/// A parsed statement of the restricted dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable {
        schema: TableSchema,
    },
    Insert {
        table_name: String,
        rows: Vec<Vec<Value>>,
    },
    Select {
        table_name: String,
        projection: Projection,
        predicate: Option<Predicate>,
    },
}
