use graphnorm_core::codec::json::{
    decode_denormalized_str, decode_store, decode_store_str, encode_denormalized, encode_result,
    encode_store,
};
use graphnorm_core::{denormalize, normalize, GraphService, SchemaRegistry};
use serde_json::{json, Value};

const SCHEMA: &str = r#"{
    "types": {
        "photo": [{ "name": "user", "type": "user", "cardinality": "single" }],
        "user": [{ "name": "photos", "type": "photo", "cardinality": "collection" }]
    }
}"#;

fn schema() -> SchemaRegistry {
    SchemaRegistry::from_json_str(SCHEMA).unwrap()
}

fn normalize_to_json(input: &str, entity_type: &str) -> Value {
    let schema = schema();
    let value = decode_denormalized_str(input, entity_type, &schema).unwrap();
    encode_result(&normalize(&schema, &value, entity_type).unwrap())
}

#[test]
fn photo_with_user_sample() {
    assert_eq!(
        normalize_to_json(r#"{"id": "foo", "user": {"id": "bar"}}"#, "photo"),
        json!({
            "result": "foo",
            "entities": {
                "photo": {"foo": {"id": "foo", "user": "bar"}},
                "user": {"bar": {"id": "bar"}}
            }
        })
    );
}

#[test]
fn photo_alone_sample_keeps_empty_user_table() {
    assert_eq!(
        normalize_to_json(r#"{"id": "foo"}"#, "photo"),
        json!({
            "result": "foo",
            "entities": {
                "photo": {"foo": {"id": "foo"}},
                "user": {}
            }
        })
    );
}

#[test]
fn user_with_photos_sample() {
    assert_eq!(
        normalize_to_json(r#"{"id": "bar", "photos": [{"id": "foo"}]}"#, "user"),
        json!({
            "result": "bar",
            "entities": {
                "photo": {"foo": {"id": "foo"}},
                "user": {"bar": {"id": "bar", "photos": ["foo"]}}
            }
        })
    );
}

#[test]
fn user_alone_sample() {
    assert_eq!(
        normalize_to_json(r#"{"id": "foo"}"#, "user"),
        json!({
            "result": "foo",
            "entities": {
                "photo": {},
                "user": {"foo": {"id": "foo"}}
            }
        })
    );
}

#[test]
fn null_reference_is_dropped_on_normalize() {
    assert_eq!(
        normalize_to_json(r#"{"id": "foo", "user": null, "title": "sunset"}"#, "photo"),
        json!({
            "result": "foo",
            "entities": {
                "photo": {"foo": {"id": "foo", "title": "sunset"}},
                "user": {}
            }
        })
    );
}

#[test]
fn store_json_roundtrip_preserves_tables() {
    let schema = schema();
    let input = json!({
        "photo": {"foo": {"id": "foo", "title": "sunset", "user": "bar"}},
        "user": {"bar": {"id": "bar", "photos": ["foo"]}},
    });

    let store = decode_store(&input, &schema).unwrap();

    assert_eq!(encode_store(&store), input);
}

#[test]
fn denormalize_from_store_json() {
    let schema = schema();
    let store = decode_store_str(
        r#"{"photo": {"foo": {"user": "bar"}}, "user": {"bar": {"name": "Ada"}}}"#,
        &schema,
    )
    .unwrap();

    let value = denormalize(&schema, "foo", "photo", &store).unwrap();

    assert_eq!(
        encode_denormalized(&value),
        json!({"id": "foo", "user": {"id": "bar", "name": "Ada"}})
    );
}

#[test]
fn service_roundtrips_through_json() {
    let service = GraphService::new(schema());
    let input = json!({"id": "bar", "name": "Ada", "photos": [{"id": "foo", "title": "sunset"}]});

    let normalized: Value =
        serde_json::from_str(&service.normalize_json(&input.to_string(), "user").unwrap()).unwrap();
    let rebuilt: Value = serde_json::from_str(
        &service
            .denormalize_json("bar", "user", &normalized["entities"].to_string())
            .unwrap(),
    )
    .unwrap();

    assert_eq!(rebuilt, input);
}

#[test]
fn service_reports_dangling_reference_from_json() {
    let service = GraphService::new(schema());
    let err = service
        .denormalize_json("foo", "photo", r#"{"photo": {"foo": {"user": "ghost"}}}"#)
        .unwrap_err();

    assert_eq!(err.to_string(), "no `user` entity with id `ghost` in store");
}
