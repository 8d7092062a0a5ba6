use kopi::{
    storage::schema::{ColumnSchema, TableSchema, parse_create_table},
    types::{
        error::{DatabaseError, ResultCode},
        value::{DataType, Value},
    },
};

#[test]
fn test_parse_create_table_basic() {
    let schema =
        parse_create_table("CREATE TABLE users (id INTEGER, username TEXT(32), score REAL)")
            .unwrap();

    assert_eq!(schema.table_name, "users");
    assert_eq!(schema.columns.len(), 3);
    assert_eq!(schema.columns[0].name, "id");
    assert_eq!(schema.columns[0].data_type, DataType::Integer);
    assert_eq!(schema.columns[1].width, 32);
    assert_eq!(schema.columns[2].data_type, DataType::Real);
    // 8 + 32 + 8, no presence bytes
    assert_eq!(schema.row_width, 48);
}

#[test]
fn test_parse_create_table_defaults_and_case() {
    let schema = parse_create_table("create table t (a text, b integer);").unwrap();
    assert_eq!(schema.columns[0].data_type, DataType::Text);
    assert_eq!(schema.columns[0].width, 64); // default TEXT capacity
    assert_eq!(schema.columns[1].data_type, DataType::Integer);
}

#[test]
fn test_parse_create_table_nullable_columns() {
    let schema =
        parse_create_table("CREATE TABLE t (id INTEGER, note NULLABLE TEXT(16))").unwrap();
    assert!(!schema.columns[0].nullable);
    assert!(schema.columns[1].nullable);
    // nullable column carries a presence byte
    assert_eq!(schema.row_width, 8 + 1 + 16);
}

#[test]
fn test_parse_create_table_duplicate_column_rejected() {
    let err = parse_create_table("CREATE TABLE t (id INTEGER, id REAL)").unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateColumn { .. }));
    assert_eq!(err.code(), ResultCode::ParseError);
}

#[test]
fn test_parse_create_table_malformed_inputs() {
    assert!(parse_create_table("CREATE TABLE t").is_err());
    assert!(parse_create_table("CREATE TABLE t ()").is_err());
    assert!(parse_create_table("CREATE TABLE t (id)").is_err());
    assert!(parse_create_table("CREATE TABLE t (id BLOB)").is_err());
    assert!(parse_create_table("CREATE TABLE t (id INTEGER extra)").is_err());
    assert!(parse_create_table("CREATE TABLE 1t (id INTEGER)").is_err());
    assert!(parse_create_table("CREATE TABLE t (name TEXT(0))").is_err());
    assert!(parse_create_table("CREATE TABLE t (name TEXT(-4))").is_err());
    assert!(parse_create_table("CREATE TABLE t (name TEXT(70000))").is_err());
}

#[test]
fn test_validate_values_accepts_matching_row() {
    let schema = TableSchema::new(
        "t".to_string(),
        vec![
            ColumnSchema::integer("id"),
            ColumnSchema::text("name", 8),
            ColumnSchema::real("score").nullable(),
        ],
    );

    schema
        .validate_values(&[
            Value::Integer(1),
            Value::Text("alice".to_string()),
            Value::Null,
        ])
        .unwrap();
}

#[test]
fn test_validate_values_rejects_bad_rows() {
    let schema = TableSchema::new(
        "t".to_string(),
        vec![ColumnSchema::integer("id"), ColumnSchema::text("name", 4)],
    );

    let err = schema.validate_values(&[Value::Integer(1)]).unwrap_err();
    assert!(matches!(err, DatabaseError::ColumnCountMismatch { .. }));

    let err = schema
        .validate_values(&[Value::Real(1.0), Value::Text("ok".to_string())])
        .unwrap_err();
    assert!(matches!(err, DatabaseError::TypeMismatch { .. }));
    assert_eq!(err.code(), ResultCode::ConstraintError);

    let err = schema
        .validate_values(&[Value::Integer(1), Value::Text("too long".to_string())])
        .unwrap_err();
    assert!(matches!(err, DatabaseError::TextOverflow { .. }));

    let err = schema
        .validate_values(&[Value::Null, Value::Text("ok".to_string())])
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NullViolation { .. }));
}
