// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Immutable record graphs with a configurable, type-tagged serializer.
//!
//! Records are built from runtime type descriptors. An instance starts as a
//! mutable [`RecordBuilder`]; `build()` runs the init hooks, validates, and
//! freezes it together with every record it owns, returning a [`Record`]
//! that can be shared freely between threads.
//!
//! # Features
//!
//! - **TypeInfo**: field descriptor sets with single inheritance, key and
//!   record categories, abstract types and init hooks
//! - **TypeRegistry**: concurrent name, alias and file-name resolution
//! - **Build lifecycle**: post-order build of nested records, cycle detection
//! - **Clone engine**: unfrozen shallow copies, also across types
//! - **RecordKey**: frozen keys as `HashMap` and `HashSet` keys
//! - **DataSerializer**: records to ordered trees and back, with a type tag
//!   policy and swappable primitive, enum and key serializers
//!
//! # Example
//!
//! ```rust
//! use recordkit::serializer::{DataSerializer, SerializerConfig};
//! use recordkit::{PrimitiveKind, RecordBuilder, TypeInfo, TypeRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let point = registry
//!     .register(
//!         TypeInfo::builder("Point")
//!             .primitive("x", PrimitiveKind::Float)
//!             .primitive("y", PrimitiveKind::Float)
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let record = RecordBuilder::new(&point)
//!     .with("x", 1.0)
//!     .unwrap()
//!     .with("y", 2.0)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! assert!(record.set("x", 3.0).is_err());
//!
//! let serializer = DataSerializer::new(registry, SerializerConfig::for_json()).unwrap();
//! let json = serializer.to_json(&record).unwrap();
//! let back = serializer.read_json(&json, None).unwrap().build().unwrap();
//! assert_eq!(back, record);
//! ```

mod build;
mod case;
mod clone;
mod error;
mod key;
mod record;
mod registry;
mod schema;
mod value;

pub mod serializer;

pub use case::{snake_to_pascal, upper_to_pascal};
pub use clone::{clone, clone_as};
pub use error::{Error, ErrorKind, Result};
pub use key::RecordKey;
pub use record::{DataRef, Freezable, Record, RecordBuilder};
pub use registry::TypeRegistry;
pub use schema::{
    EnumInfo, FieldKind, FieldSpec, InitHook, PrimitiveKind, TypeCategory, TypeInfo,
    TypeInfoBuilder,
};
pub use value::{EnumValue, FromValue, Value};
