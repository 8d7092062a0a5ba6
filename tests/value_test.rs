use kopi::types::{
    row::Row,
    value::{DataType, Value},
};

#[test]
fn test_value_creation_and_data_types() {
    let null_val = Value::Null;
    let int_val = Value::Integer(42);
    let real_val = Value::Real(3.14);
    let text_val = Value::Text("hello".to_string());

    assert_eq!(null_val.data_type(), DataType::Null);
    assert_eq!(int_val.data_type(), DataType::Integer);
    assert_eq!(real_val.data_type(), DataType::Real);
    assert_eq!(text_val.data_type(), DataType::Text);
    assert!(null_val.is_null());
    assert!(!int_val.is_null());
}

#[test]
fn test_value_comparison_for_predicates() {
    // Integer comparisons
    assert!(Value::Integer(5) < Value::Integer(10));
    assert!(Value::Integer(10) > Value::Integer(5));
    assert!(Value::Integer(5) == Value::Integer(5));

    // Mixed numeric comparisons (important for WHERE clauses)
    assert!(Value::Integer(5) < Value::Real(5.5));
    assert!(Value::Real(3.14) < Value::Integer(4));
    assert!(Value::Real(95.5) > Value::Integer(90));

    // Text comparisons (byte lexicographic)
    assert!(Value::Text("apple".to_string()) < Value::Text("banana".to_string()));
    assert!(Value::Text("a".to_string()) < Value::Text("ab".to_string()));

    // Null compares equal to Null, incomparable to everything else
    assert_eq!(
        Value::Null.partial_cmp(&Value::Null),
        Some(std::cmp::Ordering::Equal)
    );
    assert_eq!(Value::Null.partial_cmp(&Value::Integer(0)), None);
    assert_eq!(
        Value::Text("5".to_string()).partial_cmp(&Value::Integer(5)),
        None
    );
}

#[test]
fn test_value_sizes_for_storage() {
    assert_eq!(Value::Null.size(), 0);
    assert_eq!(Value::Integer(123).size(), 8);
    assert_eq!(Value::Real(3.14).size(), 8);
    assert_eq!(Value::Text("hello".to_string()).size(), 5);

    let large_text = Value::Text("a".repeat(1000));
    assert_eq!(large_text.size(), 1000);
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Null.to_string(), "NULL");
    assert_eq!(Value::Integer(42).to_string(), "42");
    assert_eq!(Value::Real(95.5).to_string(), "95.5");
    assert_eq!(Value::Text("alice".to_string()).to_string(), "alice");
}

#[test]
fn test_row_serialization_round_trip() {
    let row = Row::new(vec![
        Value::Integer(7),
        Value::Text("widget".to_string()),
        Value::Real(1.25),
        Value::Null,
    ]);

    let bytes = bincode::serde::encode_to_vec(&row, bincode::config::standard()).unwrap();
    let (decoded, _): (Row, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
    assert_eq!(decoded, row);
}

#[test]
fn test_row_deserialization_rejects_truncated_input() {
    let row = Row::new(vec![Value::Text("payload".to_string())]);
    let bytes = bincode::serde::encode_to_vec(&row, bincode::config::standard()).unwrap();

    let result: Result<(Row, usize), _> =
        bincode::serde::decode_from_slice(&bytes[..bytes.len() - 1], bincode::config::standard());
    assert!(result.is_err());
}
