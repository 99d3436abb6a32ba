// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Cross-format round-trip properties: every supported descriptor shape
// survives encode -> decode unchanged in each of the four wire formats,
// shared references replay into one materialized instance where the
// format can express them, and tolerance/error paths behave as configured.

use hserial::{
    decode, decode_from_reader, encode, encode_to_writer, ChoiceBuilder, Error, Instance,
    PrimitiveKind, RecordBuilder, SharedValue, StreamConfig, TypeDescriptor, TypeRegistry,
    Value, WireFormat,
};
use std::io::{Seek, SeekFrom};
use std::sync::Arc;

const ALL_FORMATS: [WireFormat; 4] = [
    WireFormat::Binary,
    WireFormat::Text,
    WireFormat::Xml,
    WireFormat::Json,
];

/// Formats with reference/back-reference syntax.
const REF_FORMATS: [WireFormat; 2] = [WireFormat::Binary, WireFormat::Text];

fn person_descriptor() -> Arc<TypeDescriptor> {
    Arc::new(
        RecordBuilder::new("Person")
            .member("name", PrimitiveKind::Str)
            .member("age", PrimitiveKind::U32)
            .optional_member("email", PrimitiveKind::Str)
            .list_member("scores", PrimitiveKind::I64)
            .member("active", PrimitiveKind::Bool)
            .member("token", PrimitiveKind::Bytes)
            .build(),
    )
}

fn person_value() -> Value {
    let mut value = Value::empty_record();
    value.set_member("name", Value::Str("Ann".into()));
    value.set_member("age", Value::U32(40));
    value.set_member(
        "scores",
        Value::List(vec![Value::I64(-3), Value::I64(0), Value::I64(250)]),
    );
    value.set_member("active", Value::Bool(true));
    value.set_member("token", Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    value
}

fn round_trip(value: &Value, desc: &TypeDescriptor, format: WireFormat) -> Value {
    let registry = TypeRegistry::new();
    let config = StreamConfig::default();
    let bytes = encode(value, desc, &registry, format, &config)
        .unwrap_or_else(|e| panic!("{} encode failed: {}", format.name(), e));
    decode(&bytes, desc, &registry, format, &config)
        .unwrap_or_else(|e| panic!("{} decode failed: {}", format.name(), e))
}

#[test]
fn record_round_trips_in_every_format() {
    let desc = person_descriptor();
    let value = person_value();
    for format in ALL_FORMATS {
        let back = round_trip(&value, &desc, format);
        assert_eq!(back, value, "{} round trip", format.name());
    }
}

#[test]
fn nested_record_round_trips_in_every_format() {
    let point = Arc::new(
        RecordBuilder::new("Point")
            .member("x", PrimitiveKind::F64)
            .member("y", PrimitiveKind::F64)
            .build(),
    );
    let desc = Arc::new(
        RecordBuilder::new("Segment")
            .member_of("from", point.clone())
            .member_of("to", point)
            .member("width", PrimitiveKind::F32)
            .build(),
    );

    let mut from = Value::empty_record();
    from.set_member("x", Value::F64(0.25));
    from.set_member("y", Value::F64(-1.5));
    let mut to = Value::empty_record();
    to.set_member("x", Value::F64(100.0));
    to.set_member("y", Value::F64(0.125));
    let mut value = Value::empty_record();
    value.set_member("from", from);
    value.set_member("to", to);
    value.set_member("width", Value::F32(2.5));

    for format in ALL_FORMATS {
        let back = round_trip(&value, &desc, format);
        assert_eq!(back, value, "{} round trip", format.name());
    }
}

#[test]
fn choice_round_trips_in_every_format() {
    let desc = Arc::new(
        ChoiceBuilder::new("Choice")
            .variant("A", PrimitiveKind::I32)
            .variant("B", PrimitiveKind::Str)
            .build(),
    );
    let value = Value::Choice("B".into(), Box::new(Value::Str("hi".into())));

    for format in ALL_FORMATS {
        let back = round_trip(&value, &desc, format);
        assert_eq!(back, value, "{} round trip", format.name());
    }
}

#[test]
fn choice_through_xml_uses_wrapping_element() {
    let desc = Arc::new(
        ChoiceBuilder::new("Choice")
            .variant("A", PrimitiveKind::I32)
            .variant("B", PrimitiveKind::Str)
            .build(),
    );
    let value = Value::Choice("B".into(), Box::new(Value::Str("hi".into())));

    let registry = TypeRegistry::new();
    let config = StreamConfig::default();
    let bytes = encode(&value, &desc, &registry, WireFormat::Xml, &config).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(
        text.contains("<Choice><B>hi</B></Choice>"),
        "unexpected xml: {}",
        text
    );

    let back = decode(&bytes, &desc, &registry, WireFormat::Xml, &config).unwrap();
    assert_eq!(back, value);
}

#[test]
fn choice_encodes_exactly_one_variant() {
    let desc = Arc::new(
        ChoiceBuilder::new("Choice")
            .variant("A", PrimitiveKind::I32)
            .variant("B", PrimitiveKind::Str)
            .build(),
    );

    // Setting variant A then variant B leaves exactly one set variant.
    let mut inst = Instance::new(&desc);
    inst.select("A", 1i32).unwrap();
    inst.select("B", "hi").unwrap();

    let registry = TypeRegistry::new();
    let config = StreamConfig::default();
    let json = encode(inst.value(), &desc, &registry, WireFormat::Json, &config).unwrap();
    assert_eq!(json, br#"{"B":"hi"}"#);
}

#[test]
fn unset_optional_member_is_omitted_from_json() {
    let desc = Arc::new(
        RecordBuilder::new("Sample")
            .optional_member("name", PrimitiveKind::Str)
            .list_member("values", PrimitiveKind::U32)
            .build(),
    );
    let mut value = Value::empty_record();
    value.set_member(
        "values",
        Value::List(vec![Value::U32(1), Value::U32(2), Value::U32(3)]),
    );

    let registry = TypeRegistry::new();
    let config = StreamConfig::default();
    let json = encode(&value, &desc, &registry, WireFormat::Json, &config).unwrap();
    assert_eq!(json, br#"{"values":[1,2,3]}"#);

    let back = decode(&json, &desc, &registry, WireFormat::Json, &config).unwrap();
    assert!(back.member("name").is_none(), "optional member reports unset");
    assert_eq!(
        back.member("values"),
        Some(&Value::List(vec![
            Value::U32(1),
            Value::U32(2),
            Value::U32(3)
        ]))
    );
}

#[test]
fn shared_reference_round_trips_to_one_instance() {
    let item = Arc::new(
        RecordBuilder::new("Item")
            .member("v", PrimitiveKind::I32)
            .build(),
    );
    let desc = Arc::new(
        RecordBuilder::new("Pair")
            .pointer_member("a", item.clone())
            .pointer_member("b", item)
            .build(),
    );

    let mut shared = Value::empty_record();
    shared.set_member("v", Value::I32(7));
    let cell = SharedValue::new(shared);
    let mut value = Value::empty_record();
    value.set_member("a", Value::Pointer(Some(cell.clone())));
    value.set_member("b", Value::Pointer(Some(cell)));

    for format in REF_FORMATS {
        let back = round_trip(&value, &desc, format);
        let a = match back.member("a") {
            Some(Value::Pointer(Some(cell))) => cell.clone(),
            other => panic!("{}: member a is {:?}", format.name(), other),
        };
        let b = match back.member("b") {
            Some(Value::Pointer(Some(cell))) => cell.clone(),
            other => panic!("{}: member b is {:?}", format.name(), other),
        };
        // Identity, not merely equality: one materialized instance.
        assert!(
            SharedValue::ptr_eq(&a, &b),
            "{}: shared identity lost",
            format.name()
        );
        assert_eq!(a.get().member("v"), Some(&Value::I32(7)));
    }
}

#[test]
fn recursive_descriptor_round_trips_through_registry() {
    let node = Arc::new(
        RecordBuilder::new("Node")
            .member("value", PrimitiveKind::I32)
            .pointer_member("next", "Node")
            .build(),
    );
    let mut builder = TypeRegistry::builder();
    builder.register(node.clone()).unwrap();
    let registry = builder.build();
    let config = StreamConfig::default();

    // 1 -> 2 -> null
    let mut tail = Value::empty_record();
    tail.set_member("value", Value::I32(2));
    tail.set_member("next", Value::Pointer(None));
    let mut head = Value::empty_record();
    head.set_member("value", Value::I32(1));
    head.set_member("next", Value::Pointer(Some(SharedValue::new(tail))));

    for format in REF_FORMATS {
        let bytes = encode(&head, &node, &registry, format, &config).unwrap();
        let back = decode(&bytes, &node, &registry, format, &config).unwrap();
        assert_eq!(back, head, "{} round trip", format.name());
    }
}

#[test]
fn unshared_linked_list_round_trips_in_every_format() {
    // No identity is seen twice, so even the reference-free formats carry
    // this graph without any duplication policy.
    let node = Arc::new(
        RecordBuilder::new("Node")
            .member("value", PrimitiveKind::I32)
            .pointer_member("next", "Node")
            .build(),
    );
    let mut builder = TypeRegistry::builder();
    builder.register(node.clone()).unwrap();
    let registry = builder.build();
    let config = StreamConfig::default();

    let mut tail = Value::empty_record();
    tail.set_member("value", Value::I32(2));
    tail.set_member("next", Value::Pointer(None));
    let mut head = Value::empty_record();
    head.set_member("value", Value::I32(1));
    head.set_member("next", Value::Pointer(Some(SharedValue::new(tail))));

    for format in ALL_FORMATS {
        let bytes = encode(&head, &node, &registry, format, &config).unwrap();
        let back = decode(&bytes, &node, &registry, format, &config)
            .unwrap_or_else(|e| panic!("{} decode failed: {}", format.name(), e));
        assert_eq!(back, head, "{} round trip", format.name());
    }
}

#[test]
fn cyclic_graph_round_trips_through_binary() {
    let node = Arc::new(
        RecordBuilder::new("Node")
            .member("value", PrimitiveKind::I32)
            .pointer_member("next", "Node")
            .build(),
    );
    let mut builder = TypeRegistry::builder();
    builder.register(node.clone()).unwrap();
    let registry = builder.build();
    let config = StreamConfig::default();

    // A node whose next pointer is the node itself.
    let cell = SharedValue::new(Value::Null);
    let mut inner = Value::empty_record();
    inner.set_member("value", Value::I32(9));
    inner.set_member("next", Value::Pointer(Some(cell.clone())));
    cell.set(inner);
    let value = Value::Pointer(Some(cell));

    let outer = Arc::new(TypeDescriptor::pointer(
        "NodeRef",
        hserial::TypeRef::from("Node"),
        true,
    ));
    let bytes = encode(&value, &outer, &registry, WireFormat::Binary, &config).unwrap();
    let back = decode(&bytes, &outer, &registry, WireFormat::Binary, &config).unwrap();

    let head = match &back {
        Value::Pointer(Some(cell)) => cell.clone(),
        other => panic!("expected pointer, got {:?}", other),
    };
    let next = head.with(|v| match v.member("next") {
        Some(Value::Pointer(Some(cell))) => cell.clone(),
        other => panic!("expected pointer member, got {:?}", other),
    });
    assert!(SharedValue::ptr_eq(&head, &next), "cycle collapsed");
    assert_eq!(head.with(|v| v.member("value").cloned()), Some(Value::I32(9)));
}

#[test]
fn sharing_without_reference_syntax_is_configured_explicitly() {
    let item = Arc::new(
        RecordBuilder::new("Item")
            .member("v", PrimitiveKind::I32)
            .build(),
    );
    let desc = Arc::new(
        RecordBuilder::new("Pair")
            .pointer_member("a", item.clone())
            .pointer_member("b", item)
            .build(),
    );

    let mut shared = Value::empty_record();
    shared.set_member("v", Value::I32(7));
    let cell = SharedValue::new(shared);
    let mut value = Value::empty_record();
    value.set_member("a", Value::Pointer(Some(cell.clone())));
    value.set_member("b", Value::Pointer(Some(cell)));

    let registry = TypeRegistry::new();

    // Default: reject.
    let strict = StreamConfig::default();
    for format in [WireFormat::Json, WireFormat::Xml] {
        let err = encode(&value, &desc, &registry, format, &strict).unwrap_err();
        assert!(
            matches!(err, Error::UnsupportedReference { .. }),
            "{}: expected UnsupportedReference, got {}",
            format.name(),
            err
        );
    }

    // Explicit opt-in: silently duplicate, decode yields two instances.
    let duplicating = StreamConfig::new().with_unshared_duplication(true);
    let json = encode(&value, &desc, &registry, WireFormat::Json, &duplicating).unwrap();
    let back = decode(&json, &desc, &registry, WireFormat::Json, &duplicating).unwrap();
    let a = match back.member("a") {
        Some(Value::Pointer(Some(cell))) => cell.clone(),
        other => panic!("member a is {:?}", other),
    };
    let b = match back.member("b") {
        Some(Value::Pointer(Some(cell))) => cell.clone(),
        other => panic!("member b is {:?}", other),
    };
    assert!(!SharedValue::ptr_eq(&a, &b), "duplication produced sharing");
    assert_eq!(a.get(), b.get());
}

#[test]
fn cycle_cannot_be_duplicated() {
    let node = Arc::new(
        RecordBuilder::new("Node")
            .member("value", PrimitiveKind::I32)
            .pointer_member("next", "Node")
            .build(),
    );
    let mut builder = TypeRegistry::builder();
    builder.register(node.clone()).unwrap();
    let registry = builder.build();

    let cell = SharedValue::new(Value::Null);
    let mut inner = Value::empty_record();
    inner.set_member("value", Value::I32(9));
    inner.set_member("next", Value::Pointer(Some(cell.clone())));
    cell.set(inner);
    let value = Value::Pointer(Some(cell));
    let outer = Arc::new(TypeDescriptor::pointer(
        "NodeRef",
        hserial::TypeRef::from("Node"),
        true,
    ));

    // Even with duplication enabled, a cycle cannot terminate.
    let config = StreamConfig::new().with_unshared_duplication(true);
    let err = encode(&value, &outer, &registry, WireFormat::Json, &config).unwrap_err();
    assert!(matches!(err, Error::UnsupportedReference { .. }));
}

#[test]
fn unknown_members_skip_or_fail_per_strict_mode() {
    let writer_desc = Arc::new(
        RecordBuilder::new("Person")
            .member("name", PrimitiveKind::Str)
            .member("shoe_size", PrimitiveKind::U32)
            .build(),
    );
    let reader_desc = Arc::new(
        RecordBuilder::new("Person")
            .member_with_id("name", 0, Arc::new(TypeDescriptor::primitive("", PrimitiveKind::Str)))
            .build(),
    );

    let mut value = Value::empty_record();
    value.set_member("name", Value::Str("Ann".into()));
    value.set_member("shoe_size", Value::U32(38));

    let registry = TypeRegistry::new();
    let tolerant = StreamConfig::default();
    let strict = StreamConfig::new().with_strict_mode(true);

    for format in ALL_FORMATS {
        let bytes = encode(&value, &writer_desc, &registry, format, &tolerant).unwrap();

        let back = decode(&bytes, &reader_desc, &registry, format, &tolerant)
            .unwrap_or_else(|e| panic!("{} tolerant decode failed: {}", format.name(), e));
        assert_eq!(back.member("name").and_then(Value::as_str), Some("Ann"));
        assert!(back.member("shoe_size").is_none());

        let err = decode(&bytes, &reader_desc, &registry, format, &strict).unwrap_err();
        assert!(
            matches!(err, Error::UnknownMember { .. }),
            "{}: expected UnknownMember, got {}",
            format.name(),
            err
        );
    }
}

#[test]
fn truncated_binary_length_reports_exact_offset() {
    let desc = Arc::new(TypeDescriptor::primitive("Name", PrimitiveKind::Str));
    let registry = TypeRegistry::new();
    let config = StreamConfig::default();

    // Valid string tag (0x06), then a uleb length byte whose continuation
    // bit promises more input than exists.
    let bytes = [0x06u8, 0x85];
    match decode(&bytes, &desc, &registry, WireFormat::Binary, &config).unwrap_err() {
        Error::Format { position, .. } => assert_eq!(position.offset, 2),
        other => panic!("expected Format error, got {}", other),
    }

    // A complete length that overruns the buffer is caught up front.
    let bytes = [0x06u8, 0x10, b'a'];
    match decode(&bytes, &desc, &registry, WireFormat::Binary, &config).unwrap_err() {
        Error::Format { position, message } => {
            assert_eq!(position.offset, 1);
            assert!(message.contains("exceeds remaining"), "{}", message);
        }
        other => panic!("expected Format error, got {}", other),
    }
}

#[test]
fn io_adapters_round_trip_through_a_file() {
    let desc = person_descriptor();
    let value = person_value();
    let registry = TypeRegistry::new();
    let config = StreamConfig::default();

    let mut file = tempfile::tempfile().unwrap();
    encode_to_writer(
        &mut file,
        &value,
        &desc,
        &registry,
        WireFormat::Text,
        &config,
    )
    .unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let back =
        decode_from_reader(&mut file, &desc, &registry, WireFormat::Text, &config).unwrap();
    assert_eq!(back, value);
}

#[test]
fn randomized_values_round_trip_in_every_format() {
    let desc = Arc::new(
        RecordBuilder::new("Blob")
            .member("id", PrimitiveKind::U64)
            .member("label", PrimitiveKind::Str)
            .optional_member("weight", PrimitiveKind::F64)
            .list_member("samples", PrimitiveKind::I32)
            .member("payload", PrimitiveKind::Bytes)
            .build(),
    );
    let registry = TypeRegistry::new();
    let config = StreamConfig::default();

    let mut rng = fastrand::Rng::with_seed(0x5EED_CAFE);
    for _ in 0..50 {
        let mut value = Value::empty_record();
        value.set_member("id", Value::U64(rng.u64(..)));
        let label: String = (0..rng.usize(0..12))
            .map(|_| rng.alphanumeric())
            .collect();
        value.set_member("label", Value::Str(label));
        if rng.bool() {
            // Finite floats only: JSON has no lexical form for the rest.
            value.set_member("weight", Value::F64(f64::from(rng.i32(..)) / 8.0));
        }
        let samples = (0..rng.usize(0..8))
            .map(|_| Value::I32(rng.i32(..)))
            .collect();
        value.set_member("samples", Value::List(samples));
        let payload = (0..rng.usize(0..16)).map(|_| rng.u8(..)).collect();
        value.set_member("payload", Value::Bytes(payload));

        for format in ALL_FORMATS {
            let back = round_trip(&value, &desc, format);
            assert_eq!(back, value, "{} round trip", format.name());
        }
    }
}
