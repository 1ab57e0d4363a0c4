// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::cast_possible_truncation)] // Test data conversions

//! DataSerializer integration tests on the order-book fixtures.

mod common;

use chrono::{TimeZone, Utc};
use recordkit::serializer::{
    DataSerializer, EnumFormat, EnumSerializer, KeySerializer, Node, ReportingSerializer,
    SerializerConfig, TypeInclusion, TypePlacement,
};
use recordkit::{ErrorKind, Record, TypeRegistry, Value};
use std::sync::Arc;

fn serializer(registry: &Arc<TypeRegistry>, config: SerializerConfig) -> DataSerializer {
    DataSerializer::new(registry.clone(), config).expect("valid configuration")
}

fn round_trip(serializer: &DataSerializer, record: &Record) -> Record {
    let node = serializer.serialize(record).expect("serialize");
    serializer
        .deserialize(&node, None)
        .expect("deserialize")
        .build()
        .expect("rebuild")
}

fn book(registry: &TypeRegistry) -> Record {
    let market = common::builder(registry, "MarketOrder")
        .with("id", "M-1")
        .expect("id")
        .with("side", recordkit::EnumValue::new("Side", "BUY"))
        .expect("side");
    common::builder(registry, "Book")
        .with("name", "main")
        .expect("name")
        .with("orders", vec![common::limit_order(registry, "L-1"), market])
        .expect("orders")
        .build()
        .expect("book")
}

// ----------------------------------------------------------------------------
// Type tags
// ----------------------------------------------------------------------------

#[test]
fn test_as_needed_tags_root_and_polymorphic_children() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = s.serialize(&book(&registry)).expect("serialize");

    assert_eq!(node.get("_type").and_then(Node::as_str), Some("Book"));
    let orders = node.get("orders").and_then(Node::as_seq).expect("orders");
    assert_eq!(orders[0].get("_type").and_then(Node::as_str), Some("LimitOrder"));
    assert_eq!(orders[1].get("_type").and_then(Node::as_str), Some("MarketOrder"));

    // Lines are declared as OrderLine and stored as OrderLine
    let lines = orders[0].get("lines").and_then(Node::as_seq).expect("lines");
    assert!(lines[0].get("_type").is_none());
}

#[test]
fn test_always_tags_every_mapping_last() {
    let registry = common::registry();
    let s = serializer(
        &registry,
        SerializerConfig::for_json()
            .with_type_inclusion(TypeInclusion::Always)
            .with_type_placement(TypePlacement::Last),
    );
    let node = s
        .serialize(&common::built_order(&registry, "O-1"))
        .expect("serialize");
    let map = node.as_map().expect("mapping");
    assert_eq!(map.keys().last().map(String::as_str), Some("_type"));

    let line = &node.get("lines").and_then(Node::as_seq).expect("lines")[0];
    assert_eq!(line.get("_type").and_then(Node::as_str), Some("OrderLine"));
    let product = line.get("product").expect("product key");
    assert_eq!(product.get("_type").and_then(Node::as_str), Some("ProductKey"));
}

#[test]
fn test_omit_requires_hint() {
    let registry = common::registry();
    let s = serializer(
        &registry,
        SerializerConfig::for_json().with_type_inclusion(TypeInclusion::Omit),
    );
    let order = common::built_order(&registry, "O-1");
    let node = s.serialize(&order).expect("serialize");
    assert!(node.get("_type").is_none());

    let err = s.deserialize(&node, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeResolution);

    let back = s
        .deserialize(&node, Some("LimitOrder"))
        .expect("hinted")
        .build()
        .expect("build");
    assert_eq!(back, order);

    // An abstract hint cannot be instantiated without a tag
    let err = s.deserialize(&node, Some("Order")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeResolution);
}

#[test]
fn test_serialize_as_declared_base() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let sample = common::builder(&registry, "Sample")
        .with("id", "s-1")
        .expect("id")
        .build()
        .expect("sample");

    let node = s.serialize_as(&sample, "Sample").expect("serialize");
    assert!(node.get("_type").is_none());
    let node = s
        .serialize_as(&common::built_order(&registry, "O-1"), "Order")
        .expect("serialize");
    assert_eq!(node.get("_type").and_then(Node::as_str), Some("LimitOrder"));

    let err = s.serialize_as(&sample, "Order").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeResolution);
}

#[test]
fn test_unknown_tag_is_type_error() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = Node::map([("_type", Node::from("NoSuchType")), ("id", Node::from("x"))]);
    let err = s.deserialize(&node, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeResolution);
    assert!(err.to_string().contains("NoSuchType"));
}

#[test]
fn test_tag_must_extend_declared_type() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = Node::map([
        ("_type", Node::from("Book")),
        ("name", Node::from("main")),
        (
            "orders",
            Node::Seq(vec![Node::map([
                ("_type", Node::from("Sample")),
                ("id", Node::from("x")),
            ])]),
        ),
    ]);
    let err = s.deserialize(&node, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeResolution);
    assert!(err.to_string().contains("orders[0]"), "{}", err);
}

// ----------------------------------------------------------------------------
// Round trips
// ----------------------------------------------------------------------------

#[test]
fn test_round_trip_under_every_preset() {
    let registry = common::registry();
    let order = common::built_order(&registry, "O-1");
    let presets = [
        ("passthrough", SerializerConfig::passthrough()),
        ("json", SerializerConfig::for_json()),
        ("ui", SerializerConfig::for_ui()),
        ("mongo", SerializerConfig::for_mongo()),
        ("sqlite", SerializerConfig::for_sqlite()),
        ("csv", SerializerConfig::for_csv()),
    ];
    for (name, config) in presets {
        let s = serializer(&registry, config);
        assert_eq!(round_trip(&s, &order), order, "preset {}", name);
    }
}

#[test]
fn test_polymorphic_book_round_trip() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let book = book(&registry);
    let back = round_trip(&s, &book);
    assert_eq!(back, book);

    let orders = back.get("orders").and_then(Value::as_sequence).expect("orders");
    let types: Vec<String> = orders
        .iter()
        .filter_map(Value::as_record)
        .map(|order| order.type_name().to_string())
        .collect();
    assert_eq!(types, ["LimitOrder", "MarketOrder"]);
}

#[test]
fn test_container_order_preserved() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = s
        .serialize(&common::built_order(&registry, "O-1"))
        .expect("serialize");

    let keys: Vec<&str> = node
        .as_map()
        .expect("mapping")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        ["_type", "id", "side", "lines", "tags", "placed_at", "trade_date", "limit"]
    );
    let tags: Vec<&str> = node
        .get("tags")
        .and_then(Node::as_map)
        .expect("tags")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(tags, ["desk", "book"]);
}

#[test]
fn test_csv_row_cells_are_flat() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_csv());
    let node = s
        .serialize(&common::built_order(&registry, "O-1"))
        .expect("serialize");
    for (key, cell) in node.as_map().expect("row") {
        assert!(matches!(cell, Node::String(_)), "{} is {}", key, cell.kind_name());
    }
    let lines = node.get("lines").and_then(Node::as_str).expect("lines cell");
    assert!(lines.starts_with("[{\"product\":\"AAA\""), "{}", lines);
}

#[test]
fn test_order_report() {
    let registry = common::registry();
    let report = ReportingSerializer::new(registry.clone())
        .serialize(&common::built_order(&registry, "O-1"))
        .expect("report");
    assert_eq!(report.get("_type"), None);
    assert_eq!(report.get("Id"), Some(&Node::from("O-1")));
    assert_eq!(report.get("Side"), Some(&Node::from("SellShort")));

    let line = &report.get("Lines").and_then(Node::as_seq).expect("lines")[0];
    assert_eq!(
        line.get("Product"),
        Some(&Node::map([("Sku", Node::from("AAA"))]))
    );
    assert_eq!(line.get("Amount"), Some(&Node::Float(21.0)));
}

#[test]
fn test_randomized_round_trip() {
    let registry = common::registry();
    let configs = [
        SerializerConfig::for_json(),
        SerializerConfig::for_csv(),
        SerializerConfig::for_mongo(),
    ];
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for _ in 0..50 {
        let id: String = (0..rng.usize(1..12)).map(|_| rng.alphanumeric()).collect();
        let lines: Vec<_> = (0..rng.usize(0..5))
            .map(|i| {
                let sku = format!("SKU{}", i);
                let price = (rng.f64() * 10_000.0).round() / 100.0;
                common::line(&registry, &sku, rng.i64(1..1_000), price)
            })
            .collect();
        let millis = rng.i64(0..4_102_444_800_000);
        let placed = Utc.timestamp_millis_opt(millis).single().expect("timestamp");
        let side = if rng.bool() { "BUY" } else { "SELL_SHORT" };

        let order = common::builder(&registry, "LimitOrder")
            .with("id", id)
            .expect("id")
            .with("side", recordkit::EnumValue::new("Side", side))
            .expect("side")
            .with("lines", lines)
            .expect("lines")
            .with("placed_at", placed)
            .expect("placed_at")
            .with("limit", rng.f64() * 1e6)
            .expect("limit")
            .build()
            .expect("build");

        for config in &configs {
            let s = serializer(&registry, config.clone());
            assert_eq!(round_trip(&s, &order), order);
        }
    }
}

// ----------------------------------------------------------------------------
// Leaves, enums and keys
// ----------------------------------------------------------------------------

#[test]
fn test_json_leaves() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = s
        .serialize(&common::built_order(&registry, "O-1"))
        .expect("serialize");

    assert_eq!(node.get("side").and_then(Node::as_str), Some("SellShort"));
    assert_eq!(
        node.get("placed_at").and_then(Node::as_str),
        Some("2024-03-01T09:30:00.000Z")
    );
    assert_eq!(node.get("trade_date").and_then(Node::as_str), Some("2024-03-01"));
    assert_eq!(node.get("limit"), Some(&Node::Float(101.25)));

    let line = &node.get("lines").and_then(Node::as_seq).expect("lines")[0];
    assert_eq!(line.get("qty"), Some(&Node::Int(2)));
    assert_eq!(
        line.get("product"),
        Some(&Node::map([("sku", Node::from("AAA"))]))
    );
}

#[test]
fn test_mongo_integer_temporals() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_mongo());
    let node = s
        .serialize(&common::built_order(&registry, "O-1"))
        .expect("serialize");
    assert_eq!(node.get("placed_at"), Some(&Node::Int(20240301093000000)));
    assert_eq!(node.get("trade_date"), Some(&Node::Int(20240301)));
}

#[test]
fn test_enum_formats() {
    let registry = common::registry();
    let order = common::built_order(&registry, "O-1");
    let cases = [
        (EnumFormat::Pascal, Node::from("SellShort")),
        (EnumFormat::Declared, Node::from("SELL_SHORT")),
        (EnumFormat::Ordinal, Node::Int(1)),
    ];
    for (format, expected) in cases {
        let s = serializer(
            &registry,
            SerializerConfig::for_json().with_enums(EnumSerializer::new(format)),
        );
        let node = s.serialize(&order).expect("serialize");
        assert_eq!(node.get("side"), Some(&expected));
        assert_eq!(round_trip(&s, &order), order);
    }
}

#[test]
fn test_enum_reader_accepts_any_format() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    for side in [Node::from("SELL_SHORT"), Node::from("SellShort"), Node::Int(1)] {
        let node = Node::map([
            ("_type", Node::from("MarketOrder")),
            ("id", Node::from("M")),
            ("side", side),
        ]);
        let order = s.deserialize(&node, None).expect("deserialize");
        assert_eq!(
            order.get("side"),
            Some(&Value::from(recordkit::EnumValue::new("Side", "SELL_SHORT")))
        );
    }

    let node = Node::map([
        ("_type", Node::from("MarketOrder")),
        ("id", Node::from("M")),
        ("side", Node::from("HOLD")),
    ]);
    let err = s.deserialize(&node, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(err.to_string().contains("'HOLD'"));
}

#[test]
fn test_ui_flattens_keys_and_pascal_cases_fields() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_ui());
    let order = common::built_order(&registry, "O-1");
    let node = s.serialize(&order).expect("serialize");

    assert_eq!(node.get("_t").and_then(Node::as_str), Some("LimitOrder"));
    assert!(node.get("Ts").is_some(), "alias of placed_at");
    assert!(node.get("TradeDate").is_some());
    let line = &node.get("Lines").and_then(Node::as_seq).expect("lines")[0];
    assert_eq!(line.get("Product").and_then(Node::as_str), Some("AAA"));
    assert_eq!(round_trip(&s, &order), order);
}

#[test]
fn test_tuple_keys() {
    let registry = common::registry();
    let s = serializer(
        &registry,
        SerializerConfig::for_json().with_keys(Some(KeySerializer::tuple())),
    );
    let order = common::built_order(&registry, "O-1");
    let node = s.serialize(&order).expect("serialize");
    let line = &node.get("lines").and_then(Node::as_seq).expect("lines")[0];
    assert_eq!(
        line.get("product"),
        Some(&Node::Seq(vec![Node::from("AAA")]))
    );
    assert_eq!(round_trip(&s, &order), order);
}

#[test]
fn test_flat_key_accepted_without_key_serializer() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = Node::map([
        ("product", Node::from("AAA")),
        ("qty", Node::Int(3)),
        ("price", Node::Float(2.0)),
    ]);
    let line = s
        .deserialize(&node, Some("OrderLine"))
        .expect("deserialize")
        .build()
        .expect("build");
    let product = line.get("product").and_then(Value::as_record).expect("key");
    assert_eq!(product.get_as::<String>("sku").expect("sku"), "AAA");
    assert_eq!(line.get_as::<f64>("amount").expect("amount"), 6.0);
}

// ----------------------------------------------------------------------------
// Malformed input
// ----------------------------------------------------------------------------

#[test]
fn test_unknown_field_reports_path() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = Node::map([
        ("_type", Node::from("MarketOrder")),
        ("id", Node::from("M")),
        ("side", Node::from("Buy")),
        (
            "lines",
            Node::Seq(vec![Node::map([
                ("product", Node::map([("sku", Node::from("A"))])),
                ("qty", Node::Int(1)),
                ("price", Node::Float(1.0)),
                ("discount", Node::Float(0.5)),
            ])]),
        ),
    ]);
    let err = s.deserialize(&node, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(err.to_string().contains("lines[0].discount"), "{}", err);
}

#[test]
fn test_wrong_leaf_kind() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = Node::map([
        ("_type", Node::from("LimitOrder")),
        ("id", Node::from("L")),
        ("side", Node::from("Buy")),
        ("limit", Node::Seq(vec![])),
    ]);
    assert!(s.deserialize(&node, None).is_err());
}

#[test]
fn test_null_fields_stay_unset() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let node = Node::map([
        ("_type", Node::from("Sample")),
        ("id", Node::from("s")),
        ("note", Node::Null),
    ]);
    let sample = s.deserialize(&node, None).expect("deserialize");
    assert!(!sample.is_set("note"));
}

#[test]
fn test_empty_string_and_containers_kept() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let order = common::limit_order(&registry, "")
        .with("lines", Vec::<Value>::new())
        .expect("lines")
        .build()
        .expect("build");
    let node = s.serialize(&order).expect("serialize");
    assert_eq!(node.get("id").and_then(Node::as_str), Some(""));
    assert_eq!(node.get("lines"), Some(&Node::Seq(vec![])));
    assert_eq!(round_trip(&s, &order), order);
}

// ----------------------------------------------------------------------------
// Text formats
// ----------------------------------------------------------------------------

#[test]
fn test_json_and_yaml_text() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let order = common::built_order(&registry, "O-1");

    let json = s.to_json(&order).expect("json");
    assert!(json.starts_with("{\n  \"_type\": \"LimitOrder\""), "{}", json);
    let back = s.read_json(&json, None).expect("read json").build().expect("build");
    assert_eq!(back, order);

    let yaml = s.to_yaml(&order).expect("yaml");
    assert!(yaml.contains("side: SellShort"), "{}", yaml);
    let back = s.read_yaml(&yaml, None).expect("read yaml").build().expect("build");
    assert_eq!(back, order);
}

#[test]
fn test_malformed_json_is_io_error() {
    let registry = common::registry();
    let s = serializer(&registry, SerializerConfig::for_json());
    let err = s.read_json("{\"_type\": ", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
