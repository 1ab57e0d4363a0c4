// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization of record graphs.
//!
//! # Layers
//!
//! - **Node**: ordered, format-neutral tree (`serde` compatible)
//! - **PrimitiveSerializer**: primitive leaves (native, text or integer temporals)
//! - **EnumSerializer**: enum items (PascalCase, declared or ordinal)
//! - **KeySerializer**: composite keys flattened into one token list
//! - **DataSerializer**: whole records, type tags and container recursion
//! - **ReportingSerializer**: one-way untagged output for reports
//!
//! The leaf serializers are plain values inside [`SerializerConfig`], so any
//! of them can be swapped without touching the others.

mod config;
mod data;
mod enums;
mod formats;
mod keys;
mod primitive;
mod reporting;
mod tree;

pub use config::{
    InnerFormat, KeyCase, SerializerConfig, TypeInclusion, TypePlacement, DEFAULT_TYPE_FIELD,
};
pub use data::DataSerializer;
pub use enums::{EnumFormat, EnumSerializer};
pub use formats::TextFormat;
pub use keys::{KeyFormat, KeySerializer, KEY_DELIMITER};
pub use primitive::{LeafFormat, PrimitiveSerializer};
pub(crate) use primitive::format_token;
pub use reporting::ReportingSerializer;
pub use tree::Node;
