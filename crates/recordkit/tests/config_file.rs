// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializer configuration files and record files on disk.

mod common;

use recordkit::serializer::{
    DataSerializer, EnumFormat, KeyCase, KeyFormat, LeafFormat, Node, SerializerConfig,
    TypeInclusion,
};
use recordkit::ErrorKind;
use std::fs;

#[test]
fn test_config_from_yaml_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("serializer.yaml");
    fs::write(
        &path,
        "type_inclusion: always\n\
         type_field: _kind\n\
         key_case: pascal\n\
         primitive:\n  date: iso_int\n  long: text\n\
         enums:\n  format: ordinal\n\
         keys:\n  format: tuple\n",
    )
    .expect("write config");

    let config = SerializerConfig::from_file(&path).expect("config");
    assert_eq!(config.type_inclusion, TypeInclusion::Always);
    assert_eq!(config.type_field, "_kind");
    assert_eq!(config.key_case, KeyCase::Pascal);
    assert_eq!(config.primitive.date, LeafFormat::IsoInt);
    assert_eq!(config.primitive.long, LeafFormat::Text);
    assert_eq!(config.primitive.float, LeafFormat::Native);
    assert_eq!(config.enums.format, EnumFormat::Ordinal);
    assert_eq!(config.keys.map(|k| k.format), Some(KeyFormat::Tuple));

    let registry = common::registry();
    let serializer = DataSerializer::new(registry.clone(), config).expect("serializer");
    let order = common::built_order(&registry, "O-1");
    let node = serializer.serialize(&order).expect("serialize");
    assert_eq!(node.get("_kind").and_then(Node::as_str), Some("LimitOrder"));
    assert_eq!(node.get("Side"), Some(&Node::Int(1)));
    assert_eq!(node.get("TradeDate"), Some(&Node::Int(20240301)));

    let back = serializer
        .deserialize(&node, None)
        .expect("deserialize")
        .build()
        .expect("build");
    assert_eq!(back, order);
}

#[test]
fn test_empty_config_file_is_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("serializer.yaml");
    fs::write(&path, "{}\n").expect("write config");
    assert_eq!(
        SerializerConfig::from_file(&path).expect("config"),
        SerializerConfig::default()
    );
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");

    let path = dir.path().join("bad_tag.yaml");
    fs::write(&path, "type_field: kind\n").expect("write config");
    let err = SerializerConfig::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let path = dir.path().join("bad_leaf.yaml");
    fs::write(&path, "primitive:\n  float: iso_int\n").expect("write config");
    let err = SerializerConfig::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let path = dir.path().join("bad_yaml.yaml");
    fs::write(&path, "type_inclusion: sometimes\n").expect("write config");
    let err = SerializerConfig::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = SerializerConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_record_file_round_trip() {
    let registry = common::registry();
    let serializer = DataSerializer::new(registry.clone(), SerializerConfig::for_json())
        .expect("serializer");
    let order = common::built_order(&registry, "O-1");
    let dir = tempfile::tempdir().expect("tempdir");

    for name in ["order.json", "order.yaml"] {
        let path = dir.path().join(name);
        serializer.write_file(&order, &path).expect("write");
        let back = serializer
            .read_file(&path)
            .expect("read")
            .build()
            .expect("build");
        assert_eq!(back, order, "{}", name);
    }

    let yaml = fs::read_to_string(dir.path().join("order.yaml")).expect("yaml text");
    assert!(yaml.starts_with("_type: LimitOrder"), "{}", yaml);
}

#[test]
fn test_file_name_is_type_hint() {
    let registry = common::registry();
    let serializer = DataSerializer::new(
        registry.clone(),
        SerializerConfig::for_json().with_type_inclusion(TypeInclusion::Omit),
    )
    .expect("serializer");
    let dir = tempfile::tempdir().expect("tempdir");

    let path = dir.path().join("sample.json");
    fs::write(&path, "{\"id\": \"s-1\", \"note\": \"hello\"}").expect("write");
    let sample = serializer
        .read_file(&path)
        .expect("read")
        .build()
        .expect("build");
    assert_eq!(sample.type_name(), "Sample");
    assert_eq!(sample.get_as::<String>("note").expect("note"), "hello");

    let path = dir.path().join("limit_order.yaml");
    let order = common::built_order(&registry, "O-1");
    serializer.write_file(&order, &path).expect("write");
    let back = serializer
        .read_file(&path)
        .expect("read")
        .build()
        .expect("build");
    assert_eq!(back, order);

    // No registered type named after the file and no tag
    let path = dir.path().join("notes.json");
    fs::write(&path, "{\"id\": \"s-1\"}").expect("write");
    let err = serializer.read_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeResolution);
}
