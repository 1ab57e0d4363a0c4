// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared order-book fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use recordkit::{
    EnumInfo, EnumValue, Error, FieldKind, FieldSpec, PrimitiveKind, Record, RecordBuilder,
    TypeInfo, TypeRegistry,
};
use std::sync::Arc;

/// Registry with:
/// - `Side` enum
/// - `ProductKey` key and `Product` record
/// - `OrderLine` data with a hook computing `amount`
/// - abstract `Order` with concrete `MarketOrder` and `LimitOrder`
/// - `Sample` with a single required `id`
pub fn registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new();

    registry
        .register_enum(EnumInfo::new("Side", ["BUY", "SELL_SHORT"]))
        .expect("side");

    let product_key = registry
        .register(
            TypeInfo::builder("ProductKey")
                .key()
                .string_field("sku")
                .build()
                .expect("product key"),
        )
        .expect("register product key");
    registry
        .register(
            TypeInfo::builder("Product")
                .record(&product_key)
                .string_field("sku")
                .string_field("name")
                .primitive("price", PrimitiveKind::Float)
                .build()
                .expect("product"),
        )
        .expect("register product");

    registry
        .register(
            TypeInfo::builder("OrderLine")
                .field(FieldSpec::new("product", FieldKind::key("ProductKey")))
                .primitive("qty", PrimitiveKind::Long)
                .primitive("price", PrimitiveKind::Float)
                .optional("amount", PrimitiveKind::Float)
                .init(|line| {
                    let qty = line.get_as::<i64>("qty")?;
                    if qty <= 0 {
                        return Err(Error::validation("OrderLine", "qty must be positive"));
                    }
                    let amount = qty as f64 * line.get_as::<f64>("price")?;
                    line.set("amount", amount)
                })
                .build()
                .expect("order line"),
        )
        .expect("register order line");

    let order = registry
        .register(
            TypeInfo::builder("Order")
                .abstract_type()
                .string_field("id")
                .field(FieldSpec::new("side", FieldKind::enumeration("Side")))
                .sequence_field("lines", FieldKind::data("OrderLine"))
                .field(FieldSpec::new("tags", FieldKind::mapping(FieldKind::string())).optional())
                .field(
                    FieldSpec::new("placed_at", PrimitiveKind::DateTime)
                        .optional()
                        .with_alias("ts"),
                )
                .field(FieldSpec::new("trade_date", PrimitiveKind::Date).optional())
                .build()
                .expect("order"),
        )
        .expect("register order");
    registry
        .register(
            TypeInfo::builder("MarketOrder")
                .extends(&order)
                .build()
                .expect("market order"),
        )
        .expect("register market order");
    registry
        .register(
            TypeInfo::builder("LimitOrder")
                .extends(&order)
                .primitive("limit", PrimitiveKind::Float)
                .build()
                .expect("limit order"),
        )
        .expect("register limit order");

    registry
        .register(
            TypeInfo::builder("Book")
                .string_field("name")
                .sequence_field("orders", FieldKind::data("Order"))
                .build()
                .expect("book"),
        )
        .expect("register book");

    registry
        .register(
            TypeInfo::builder("Sample")
                .string_field("id")
                .optional("note", PrimitiveKind::String)
                .build()
                .expect("sample"),
        )
        .expect("register sample");

    Arc::new(registry)
}

pub fn builder(registry: &TypeRegistry, type_name: &str) -> RecordBuilder {
    RecordBuilder::new(&registry.resolve(type_name).expect("registered type"))
}

pub fn product_key(registry: &TypeRegistry, sku: &str) -> RecordBuilder {
    builder(registry, "ProductKey").with("sku", sku).expect("sku")
}

pub fn line(registry: &TypeRegistry, sku: &str, qty: i64, price: f64) -> RecordBuilder {
    builder(registry, "OrderLine")
        .with("product", product_key(registry, sku))
        .expect("product")
        .with("qty", qty)
        .expect("qty")
        .with("price", price)
        .expect("price")
}

/// Unbuilt limit order with two lines, tags and timestamps.
pub fn limit_order(registry: &TypeRegistry, id: &str) -> RecordBuilder {
    let mut tags = indexmap::IndexMap::new();
    tags.insert("desk".to_string(), "rates");
    tags.insert("book".to_string(), "alpha");

    builder(registry, "LimitOrder")
        .with("id", id)
        .expect("id")
        .with("side", EnumValue::new("Side", "SELL_SHORT"))
        .expect("side")
        .with(
            "lines",
            vec![line(registry, "AAA", 2, 10.5), line(registry, "BBB", 1, 99.0)],
        )
        .expect("lines")
        .with("tags", tags)
        .expect("tags")
        .with(
            "placed_at",
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().expect("timestamp"),
        )
        .expect("placed_at")
        .with(
            "trade_date",
            NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
        )
        .expect("trade_date")
        .with("limit", 101.25)
        .expect("limit")
}

pub fn built_order(registry: &TypeRegistry, id: &str) -> Record {
    limit_order(registry, id).build().expect("build order")
}
