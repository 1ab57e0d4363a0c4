// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data serializer configuration.
//!
//! A configuration is a plain serde struct, so it can be declared in YAML:
//!
//! ```yaml
//! type_inclusion: always
//! type_field: _t
//! key_case: pascal
//! primitive:
//!   date: iso_int
//! enums:
//!   format: ordinal
//! keys:
//!   format: delimited
//! inner: json
//! ```
//!
//! Omitted settings take their [`Default`] value.

use super::enums::{EnumFormat, EnumSerializer};
use super::keys::KeySerializer;
use super::primitive::PrimitiveSerializer;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default reserved key holding the type tag.
pub const DEFAULT_TYPE_FIELD: &str = "_type";

/// When the type tag is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeInclusion {
    /// Never. Reading requires a type hint.
    Omit,
    /// At the root and where the runtime type differs from the declared one.
    #[default]
    AsNeeded,
    /// On every record mapping.
    Always,
}

/// Position of the type tag among the keys of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypePlacement {
    #[default]
    First,
    Last,
}

/// Casing of output keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCase {
    /// Field names as declared (snake_case).
    #[default]
    Declared,
    /// `trade_id` is written as `TradeId`.
    Pascal,
}

/// Encoding of nested records and containers held by the root record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InnerFormat {
    /// Compact JSON text, one cell per field.
    Json,
}

/// Settings of a [`DataSerializer`](super::DataSerializer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    pub type_inclusion: TypeInclusion,
    /// Reserved key of the type tag; must start with `_`.
    pub type_field: String,
    pub type_placement: TypePlacement,
    pub key_case: KeyCase,
    /// Write field aliases instead of declared names where present.
    pub use_aliases: bool,
    pub primitive: PrimitiveSerializer,
    pub enums: EnumSerializer,
    /// Flattened key format; `None` writes keys as nested mappings.
    pub keys: Option<KeySerializer>,
    /// Embedded encoding of the root's nested values; `None` writes them as
    /// subtrees.
    pub inner: Option<InnerFormat>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            type_inclusion: TypeInclusion::AsNeeded,
            type_field: DEFAULT_TYPE_FIELD.to_string(),
            type_placement: TypePlacement::First,
            key_case: KeyCase::Declared,
            use_aliases: false,
            primitive: PrimitiveSerializer::text(),
            enums: EnumSerializer::default(),
            keys: None,
            inner: None,
        }
    }
}

impl SerializerConfig {
    /// Typed leaves, declared enum names, nested keys.
    pub fn passthrough() -> Self {
        Self {
            primitive: PrimitiveSerializer::native(),
            enums: EnumSerializer::new(EnumFormat::Declared),
            ..Self::default()
        }
    }

    /// JSON-safe tree: native booleans and numbers, text for the rest.
    pub fn for_json() -> Self {
        Self {
            primitive: PrimitiveSerializer::json(),
            ..Self::default()
        }
    }

    /// Presentation layer: every mapping tagged, PascalCase keys, flat keys.
    pub fn for_ui() -> Self {
        Self {
            type_inclusion: TypeInclusion::Always,
            type_field: "_t".to_string(),
            key_case: KeyCase::Pascal,
            use_aliases: true,
            primitive: PrimitiveSerializer::json(),
            keys: Some(KeySerializer::delimited()),
            ..Self::default()
        }
    }

    /// Document store: integer temporals.
    pub fn for_mongo() -> Self {
        Self {
            primitive: PrimitiveSerializer::iso_int(),
            ..Self::default()
        }
    }

    /// Relational store: every mapping tagged at the end, flat keys, nested
    /// values as JSON columns.
    pub fn for_sqlite() -> Self {
        Self {
            type_inclusion: TypeInclusion::Always,
            type_placement: TypePlacement::Last,
            primitive: PrimitiveSerializer::json(),
            keys: Some(KeySerializer::delimited()),
            inner: Some(InnerFormat::Json),
            ..Self::default()
        }
    }

    /// Tabular text: every leaf as text, flat keys, nested values as JSON
    /// cells.
    pub fn for_csv() -> Self {
        Self {
            keys: Some(KeySerializer::delimited()),
            inner: Some(InnerFormat::Json),
            ..Self::default()
        }
    }

    pub fn with_type_inclusion(mut self, inclusion: TypeInclusion) -> Self {
        self.type_inclusion = inclusion;
        self
    }

    pub fn with_type_field(mut self, field: impl Into<String>) -> Self {
        self.type_field = field.into();
        self
    }

    pub fn with_type_placement(mut self, placement: TypePlacement) -> Self {
        self.type_placement = placement;
        self
    }

    pub fn with_key_case(mut self, case: KeyCase) -> Self {
        self.key_case = case;
        self
    }

    pub fn with_aliases(mut self, use_aliases: bool) -> Self {
        self.use_aliases = use_aliases;
        self
    }

    pub fn with_primitive(mut self, primitive: PrimitiveSerializer) -> Self {
        self.primitive = primitive;
        self
    }

    pub fn with_enums(mut self, enums: EnumSerializer) -> Self {
        self.enums = enums;
        self
    }

    pub fn with_keys(mut self, keys: Option<KeySerializer>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_inner(mut self, inner: Option<InnerFormat>) -> Self {
        self.inner = inner;
        self
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check settings that do not depend on registered types.
    pub fn validate(&self) -> Result<()> {
        if self.type_field.is_empty() {
            return Err(Error::Config("type field is empty".into()));
        }
        if !self.type_field.starts_with('_') {
            return Err(Error::Config(format!(
                "type field '{}' must start with '_'",
                self.type_field
            )));
        }
        if self.type_field.chars().any(char::is_whitespace) {
            return Err(Error::Config(format!(
                "type field '{}' contains whitespace",
                self.type_field
            )));
        }
        self.primitive.validate()
    }
}
