mod common;

use common::{Person, Task, memory_backend};
use kvgraph::{
    KvGraphError, SchemaRegistry,
    codec::{decode, encode, parse_payload},
};
use serde_json::json;

#[test]
fn test_encoded_form_uses_codes() {
    let registry = SchemaRegistry::new(memory_backend());
    let schema = registry.resolve::<Person>().unwrap();
    let bytes = encode(&Person::new("fay", 27), &schema).expect("encode");
    let payload = parse_payload(&bytes).expect("payload");
    assert_eq!(
        serde_json::Value::Object(payload),
        json!({"n": "fay", "a": 27, "e": "fay@example.org"})
    );
}

#[test]
fn test_decode_skips_unknown_codes() {
    let registry = SchemaRegistry::new(memory_backend());
    let schema = registry.resolve::<Person>().unwrap();
    let bytes = serde_json::to_vec(&json!({"n": "gus", "a": 3, "q": [1, 2], "_s": "x"})).unwrap();
    let mut person = Person::default();
    decode(&bytes, &schema, &mut person).expect("decode");
    assert_eq!(person.name, "gus");
    assert_eq!(person.age, 3);
    assert_eq!(person.email, "");
}

#[test]
fn test_decode_type_mismatch_is_an_error() {
    let registry = SchemaRegistry::new(memory_backend());
    let schema = registry.resolve::<Person>().unwrap();
    let bytes = serde_json::to_vec(&json!({"a": "old"})).unwrap();
    let mut person = Person::default();
    assert!(matches!(
        decode(&bytes, &schema, &mut person),
        Err(KvGraphError::Decoding(_))
    ));
}

#[test]
fn test_decode_reads_integral_float() {
    let registry = SchemaRegistry::new(memory_backend());
    let schema = registry.resolve::<Task>().unwrap();
    let bytes = serde_json::to_vec(&json!({"x": 3, "u": "2024-02-03T04:05:06Z"})).unwrap();
    let mut task = Task::default();
    decode(&bytes, &schema, &mut task).expect("decode");
    assert_eq!(task.estimate, 3.0);
    assert!(task.due.is_some());
}

#[test]
fn test_nan_cannot_be_encoded() {
    let registry = SchemaRegistry::new(memory_backend());
    let schema = registry.resolve::<Task>().unwrap();
    let task = Task {
        key: "nan".into(),
        estimate: f64::NAN,
        ..Task::default()
    };
    assert!(matches!(
        encode(&task, &schema),
        Err(KvGraphError::Encoding(_))
    ));
}
