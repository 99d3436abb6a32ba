// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Binary golden vectors: reference files pinning the tag/length/value
// layout external consumers depend on.
//
// Default mode: VERIFY -- compares encoded bytes against existing .bin files.
// Regeneration: set env GOLDEN_REGEN=1 to overwrite .bin + .hex files.
//
// Each test encodes a known deterministic value and verifies byte-exact
// roundtrip: encode -> decode -> re-encode == original bytes.

use hserial::{
    encode, decode, PrimitiveKind, RecordBuilder, SharedValue, StreamConfig, TypeDescriptor,
    TypeRegistry, Value, WireFormat,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

const GOLDEN_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/golden");

fn is_regen_mode() -> bool {
    std::env::var("GOLDEN_REGEN").is_ok()
}

fn golden_path(name: &str, ext: &str) -> PathBuf {
    PathBuf::from(GOLDEN_DIR).join(format!("{name}.{ext}"))
}

fn write_golden(name: &str, bytes: &[u8]) {
    fs::write(golden_path(name, "bin"), bytes).unwrap();

    let mut hex = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        use std::fmt::Write;
        write!(hex, "{:08x}  ", i * 16).unwrap();
        for b in chunk {
            write!(hex, "{b:02x} ").unwrap();
        }
        hex.push('\n');
    }
    fs::write(golden_path(name, "hex"), &hex).unwrap();
}

fn golden_test(name: &str, desc: &Arc<TypeDescriptor>, value: &Value, registry: &TypeRegistry) {
    let config = StreamConfig::default();
    let bytes = encode(value, desc, registry, WireFormat::Binary, &config).unwrap();

    if is_regen_mode() {
        write_golden(name, &bytes);
    }

    let expected = fs::read(golden_path(name, "bin")).unwrap_or_else(|_| {
        panic!("golden file {}.bin missing; run with GOLDEN_REGEN=1 to create it", name)
    });
    assert_eq!(bytes, expected, "{}: encoding drifted from golden bytes", name);

    // Byte-exact round trip: decode then re-encode must reproduce the
    // wire image bit for bit.
    let decoded = decode(&bytes, desc, registry, WireFormat::Binary, &config).unwrap();
    let re_encoded = encode(&decoded, desc, registry, WireFormat::Binary, &config).unwrap();
    assert_eq!(re_encoded, bytes, "{}: re-encode drifted", name);
}

#[test]
fn golden_person_basic() {
    let desc = Arc::new(
        RecordBuilder::new("Person")
            .member("name", PrimitiveKind::Str)
            .member("age", PrimitiveKind::U32)
            .build(),
    );
    let mut value = Value::empty_record();
    value.set_member("name", Value::Str("Ann".into()));
    value.set_member("age", Value::U32(40));

    golden_test("person_basic", &desc, &value, &TypeRegistry::new());
}

#[test]
fn golden_shared_pair() {
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

    golden_test("shared_pair", &desc, &value, &TypeRegistry::new());
}

#[test]
fn golden_scalar_extremes() {
    let desc = Arc::new(
        RecordBuilder::new("Extremes")
            .member("min", PrimitiveKind::I64)
            .member("max", PrimitiveKind::U64)
            .member("zero", PrimitiveKind::I32)
            .member("pi", PrimitiveKind::F64)
            .build(),
    );
    let mut value = Value::empty_record();
    value.set_member("min", Value::I64(i64::MIN));
    value.set_member("max", Value::U64(u64::MAX));
    value.set_member("zero", Value::I32(0));
    value.set_member("pi", Value::F64(std::f64::consts::PI));

    golden_test("scalar_extremes", &desc, &value, &TypeRegistry::new());
}
