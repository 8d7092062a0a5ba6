use kopi::{
    storage::{
        codec::{decode_row, encode_row},
        header::TableHeader,
        schema::{ColumnSchema, TableSchema, parse_create_table},
    },
    types::{
        error::DatabaseError,
        value::Value,
    },
};

fn sample_schema() -> TableSchema {
    TableSchema::new(
        "events".to_string(),
        vec![
            ColumnSchema::integer("id"),
            ColumnSchema::text("name", 16),
            ColumnSchema::real("score").nullable(),
        ],
    )
}

#[test]
fn test_codec_round_trip() {
    let schema = sample_schema();
    let values = vec![
        Value::Integer(42),
        Value::Text("alice".to_string()),
        Value::Real(95.5),
    ];

    let bytes = encode_row(&schema, &values).unwrap();
    assert_eq!(bytes.len(), schema.row_width);
    assert_eq!(decode_row(&schema, &bytes).unwrap(), values);
}

#[test]
fn test_codec_null_round_trip() {
    let schema = sample_schema();
    let values = vec![
        Value::Integer(1),
        Value::Text("bob".to_string()),
        Value::Null,
    ];

    let bytes = encode_row(&schema, &values).unwrap();
    assert_eq!(decode_row(&schema, &bytes).unwrap(), values);
}

#[test]
fn test_codec_text_at_exact_capacity() {
    let schema = sample_schema();
    let full = "0123456789abcdef".to_string(); // exactly 16 bytes
    let values = vec![Value::Integer(2), Value::Text(full.clone()), Value::Real(0.0)];

    let bytes = encode_row(&schema, &values).unwrap();
    let decoded = decode_row(&schema, &bytes).unwrap();
    assert_eq!(decoded[1], Value::Text(full));
}

#[test]
fn test_codec_empty_text() {
    let schema = sample_schema();
    let values = vec![
        Value::Integer(3),
        Value::Text(String::new()),
        Value::Real(1.0),
    ];

    let bytes = encode_row(&schema, &values).unwrap();
    assert_eq!(decode_row(&schema, &bytes).unwrap()[1], Value::Text(String::new()));
}

#[test]
fn test_encode_rejects_invalid_rows() {
    let schema = sample_schema();

    let err = encode_row(&schema, &[Value::Integer(1)]).unwrap_err();
    assert!(matches!(err, DatabaseError::ColumnCountMismatch { .. }));

    let err = encode_row(
        &schema,
        &[
            Value::Real(1.0), // Integer column; no implicit coercion
            Value::Text("x".to_string()),
            Value::Real(0.0),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, DatabaseError::TypeMismatch { .. }));

    let err = encode_row(
        &schema,
        &[
            Value::Integer(1),
            Value::Text("a".repeat(17)), // one byte past capacity
            Value::Real(0.0),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, DatabaseError::TextOverflow { .. }));
}

#[test]
fn test_decode_rejects_short_buffer() {
    let schema = sample_schema();
    let bytes = vec![0u8; schema.row_width - 1];
    assert!(decode_row(&schema, &bytes).is_err());
}

#[test]
fn test_header_round_trip() {
    let schema =
        parse_create_table("CREATE TABLE users (id INTEGER, username TEXT(32), score REAL)")
            .unwrap();
    let header = TableHeader::new(schema).unwrap();

    let bytes = header.to_bytes();
    let decoded = TableHeader::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, header);
    assert_eq!(decoded.schema.row_width, header.schema.row_width);
}

#[test]
fn test_header_rejects_corruption() {
    let schema = parse_create_table("CREATE TABLE t (id INTEGER)").unwrap();
    let header = TableHeader::new(schema).unwrap();
    let good = header.to_bytes();

    let mut bad_magic = good.clone();
    bad_magic[0] = b'X';
    assert!(TableHeader::from_bytes(&bad_magic).is_err());

    let mut bad_version = good.clone();
    bad_version[8] = 99;
    assert!(TableHeader::from_bytes(&bad_version).is_err());

    // Flip a byte inside the checksummed schema region
    let mut bad_schema = good.clone();
    bad_schema[30] ^= 0xFF;
    assert!(TableHeader::from_bytes(&bad_schema).is_err());

    assert!(TableHeader::from_bytes(&good[..100]).is_err());
}

#[test]
fn test_header_rejects_oversized_schema() {
    let columns: Vec<ColumnSchema> = (0..17)
        .map(|i| ColumnSchema::integer(&format!("c{}", i)))
        .collect();
    let schema = TableSchema::new("wide".to_string(), columns);
    assert!(TableHeader::new(schema).is_err());

    let schema = TableSchema::new(
        "a".repeat(32), // one past the 31-byte name limit
        vec![ColumnSchema::integer("id")],
    );
    assert!(TableHeader::new(schema).is_err());
}
