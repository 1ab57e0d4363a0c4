// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record <-> [`Node`] conversion.
//!
//! Writing walks the fields of a frozen record in descriptor order and
//! delegates leaves to the configured primitive, enum and key serializers.
//! Reading resolves the runtime type from the type tag or the caller's hint,
//! decodes every entry and returns an unfrozen builder; the caller decides
//! when to build it.

use super::config::{InnerFormat, KeyCase, SerializerConfig, TypeInclusion, TypePlacement};
use super::keys::{KeyContext, KeySerializer};
use super::tree::Node;
use crate::case::snake_to_pascal;
use crate::error::{entry_path, field_path, index_path, Error, Result};
use crate::record::{DataRef, Record, RecordBuilder};
use crate::registry::TypeRegistry;
use crate::schema::{FieldKind, FieldSpec, TypeInfo};
use crate::value::Value;
use dashmap::DashMap;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Output keys of one type under the active configuration.
#[derive(Debug)]
struct FieldLayout {
    /// Output key per field, in descriptor order.
    keys: Vec<String>,
    /// Output key -> field index.
    index: HashMap<String, usize>,
}

/// Converts records to and from serialized trees.
///
/// Safe to share between threads. Output key layouts are computed once per
/// type and cached.
pub struct DataSerializer {
    registry: Arc<TypeRegistry>,
    config: SerializerConfig,
    layouts: DashMap<String, Arc<FieldLayout>>,
}

impl fmt::Debug for DataSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSerializer")
            .field("types", &self.registry.type_names().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DataSerializer {
    /// Create a serializer, validating `config` against every registered type.
    pub fn new(registry: Arc<TypeRegistry>, config: SerializerConfig) -> Result<Self> {
        config.validate()?;
        let serializer = Self {
            registry,
            config,
            layouts: DashMap::new(),
        };
        for info in serializer.registry.types() {
            serializer.layout(&info)?;
        }
        log::debug!(
            "[serializer] ready: {} types, inclusion {:?}, tag '{}'",
            serializer.registry.type_names().len(),
            serializer.config.type_inclusion,
            serializer.config.type_field
        );
        Ok(serializer)
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Serialize a frozen record. The root is tagged unless tags are omitted.
    pub fn serialize(&self, record: &Record) -> Result<Node> {
        self.encode_record(record, None, "", true)
    }

    /// Serialize a record stored where `declared` is expected.
    ///
    /// With [`TypeInclusion::AsNeeded`] the root is tagged only when its
    /// runtime type differs from `declared`.
    pub fn serialize_as(&self, record: &Record, declared: &str) -> Result<Node> {
        let declared = self.registry.canonical_name(declared)?;
        if !record.type_info().is_subtype_of(&declared) {
            return Err(Error::TypeMismatch {
                path: String::new(),
                expected: declared,
                actual: record.type_name().to_string(),
            });
        }
        self.encode_record(record, Some(&declared), "", true)
    }

    /// Read a tree into an unfrozen record.
    ///
    /// `type_hint` is used when the root carries no type tag, and otherwise
    /// must be a base of the tagged type.
    pub fn deserialize(&self, node: &Node, type_hint: Option<&str>) -> Result<RecordBuilder> {
        self.decode_record(node, type_hint, "")
    }

    fn key_context(&self) -> KeyContext<'_> {
        KeyContext {
            registry: &self.registry,
            enums: &self.config.enums,
        }
    }

    // ------------------------------------------------------------------------
    // Output keys
    // ------------------------------------------------------------------------

    fn output_key(&self, spec: &FieldSpec) -> String {
        let name = match (&spec.alias, self.config.use_aliases) {
            (Some(alias), true) => alias.as_str(),
            _ => spec.name.as_str(),
        };
        match self.config.key_case {
            KeyCase::Declared => name.to_string(),
            KeyCase::Pascal => snake_to_pascal(name),
        }
    }

    fn layout(&self, info: &TypeInfo) -> Result<Arc<FieldLayout>> {
        if let Some(layout) = self.layouts.get(info.name()) {
            return Ok(layout.value().clone());
        }

        let mut keys = Vec::with_capacity(info.fields().len());
        let mut index = HashMap::with_capacity(info.fields().len());
        for (i, spec) in info.fields().iter().enumerate() {
            let key = self.output_key(spec);
            // An alias equal to the tag is rejected even while aliases are off
            if key == self.config.type_field
                || spec.alias.as_deref() == Some(self.config.type_field.as_str())
            {
                return Err(Error::schema(
                    info.name(),
                    format!(
                        "field '{}' is written as '{}', the type tag key",
                        spec.name, self.config.type_field
                    ),
                ));
            }
            if let Some(other) = index.insert(key.clone(), i) {
                return Err(Error::schema(
                    info.name(),
                    format!(
                        "fields '{}' and '{}' are both written as '{}'",
                        info.fields()[other].name,
                        spec.name,
                        key
                    ),
                ));
            }
            keys.push(key);
        }

        let layout = Arc::new(FieldLayout { keys, index });
        self.layouts
            .insert(info.name().to_string(), layout.clone());
        Ok(layout)
    }

    // ------------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------------

    /// `top` marks the record whose containers and nested records may be
    /// embedded as JSON text.
    fn encode_record(
        &self,
        record: &Record,
        declared: Option<&str>,
        path: &str,
        top: bool,
    ) -> Result<Node> {
        let info = record.type_info();
        let layout = self.layout(info)?;

        let tagged = match self.config.type_inclusion {
            TypeInclusion::Omit => false,
            TypeInclusion::Always => true,
            TypeInclusion::AsNeeded => match declared {
                Some(declared) => self.registry.canonical_name(declared)? != info.name(),
                None => true,
            },
        };
        if tagged {
            // A tag nobody can resolve would not read back
            self.registry.resolve(info.name())?;
        }

        let mut map = IndexMap::with_capacity(info.fields().len() + 1);
        let tag = || Node::String(info.name().to_string());
        if tagged && self.config.type_placement == TypePlacement::First {
            map.insert(self.config.type_field.clone(), tag());
        }
        for ((spec, slot), key) in info.fields().iter().zip(record.slots()).zip(&layout.keys) {
            if let Some(value) = slot {
                let mut node =
                    self.encode_value(value, &spec.kind, &field_path(path, &spec.name))?;
                if top && self.embeds(&spec.kind) {
                    node = Node::String(serde_json::to_string(&node)?);
                }
                map.insert(key.clone(), node);
            }
        }
        if tagged && self.config.type_placement == TypePlacement::Last {
            map.insert(self.config.type_field.clone(), tag());
        }
        Ok(Node::Map(map))
    }

    /// Whether a field of `kind` is written as embedded JSON text.
    fn embeds(&self, kind: &FieldKind) -> bool {
        self.config.inner == Some(InnerFormat::Json)
            && matches!(
                kind,
                FieldKind::Data(_) | FieldKind::Sequence(_) | FieldKind::Mapping(_)
            )
    }

    fn encode_value(&self, value: &Value, kind: &FieldKind, path: &str) -> Result<Node> {
        match (kind, value) {
            (FieldKind::Primitive(p), value) => self.config.primitive.serialize(value, *p, path),
            (FieldKind::Enum(name), Value::Enum(item)) => {
                let info = self.registry.resolve_enum(name)?;
                self.config.enums.serialize(item, &info, path)
            }
            (FieldKind::Key(name), Value::Data(data)) => {
                let key = frozen(data, path)?;
                match &self.config.keys {
                    Some(keys) => keys.serialize(&key, name, &self.key_context(), path),
                    None => self.encode_record(&key, Some(name), path, false),
                }
            }
            (FieldKind::Data(name), Value::Data(data)) => {
                self.encode_record(&frozen(data, path)?, Some(name), path, false)
            }
            (FieldKind::Sequence(inner), Value::Sequence(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.encode_value(item, inner, &index_path(path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Node::Seq),
            (FieldKind::Mapping(inner), Value::Mapping(entries)) => entries
                .iter()
                .map(|(k, item)| {
                    self.encode_value(item, inner, &entry_path(path, k))
                        .map(|node| (k.clone(), node))
                })
                .collect::<Result<IndexMap<_, _>>>()
                .map(Node::Map),
            (kind, value) => Err(Error::TypeMismatch {
                path: path.to_string(),
                expected: kind.to_string(),
                actual: value.kind_name(),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------------

    fn resolve_runtime(
        &self,
        tag: Option<&str>,
        expected: Option<&str>,
        path: &str,
    ) -> Result<Arc<TypeInfo>> {
        let info = match (tag, expected) {
            (Some(tag), Some(expected)) => {
                let expected = self.registry.resolve(expected)?;
                let runtime = self.registry.resolve(tag)?;
                if !runtime.is_subtype_of(expected.name()) {
                    return Err(Error::TypeMismatch {
                        path: path.to_string(),
                        expected: expected.name().to_string(),
                        actual: runtime.name().to_string(),
                    });
                }
                runtime
            }
            (Some(tag), None) => self.registry.resolve(tag)?,
            (None, Some(expected)) => self.registry.resolve(expected)?,
            (None, None) => {
                return Err(Error::MissingType {
                    tag: self.config.type_field.clone(),
                    path: path.to_string(),
                })
            }
        };
        if info.is_abstract() {
            return Err(Error::TypeMismatch {
                path: path.to_string(),
                expected: format!("a concrete subtype of {}", info.name()),
                actual: info.name().to_string(),
            });
        }
        Ok(info)
    }

    fn decode_record(
        &self,
        node: &Node,
        expected: Option<&str>,
        path: &str,
    ) -> Result<RecordBuilder> {
        let entries = node.as_map().ok_or_else(|| {
            Error::structural(
                path,
                format!("expected a mapping, found {}", node.kind_name()),
            )
        })?;

        let tag = match entries.get(&self.config.type_field) {
            None | Some(Node::Null) => None,
            Some(Node::String(tag)) => Some(tag.as_str()),
            Some(other) => {
                return Err(Error::structural(
                    &field_path(path, &self.config.type_field),
                    format!("type tag must be a string, found {}", other.kind_name()),
                ))
            }
        };

        let info = self.resolve_runtime(tag, expected, path)?;
        let layout = self.layout(&info)?;
        let mut builder = RecordBuilder::new(&info);

        for (key, child) in entries {
            if *key == self.config.type_field || child.is_null() {
                continue;
            }
            let index = match layout.index.get(key) {
                Some(index) => *index,
                // Reserved keys written by the store (`_id`, `_rev`, ...)
                None if key.starts_with('_') => continue,
                None => {
                    return Err(Error::structural(
                        &field_path(path, key),
                        format!("unknown field '{}' for {}", key, info.name()),
                    ))
                }
            };
            let spec = &info.fields()[index];
            let value = self.decode_value(child, &spec.kind, &field_path(path, &spec.name))?;
            builder.set_slot(index, value);
        }
        Ok(builder)
    }

    fn decode_value(&self, node: &Node, kind: &FieldKind, path: &str) -> Result<Value> {
        if let Node::String(text) = node {
            if self.embeds(kind) {
                let inner: Node = serde_json::from_str(text).map_err(|e| {
                    Error::structural(path, format!("invalid embedded JSON: {}", e))
                })?;
                return self.decode_value(&inner, kind, path);
            }
        }
        match kind {
            FieldKind::Primitive(p) => self.config.primitive.deserialize(node, *p, path),
            FieldKind::Enum(name) => {
                let info = self.registry.resolve_enum(name)?;
                Ok(Value::Enum(self.config.enums.deserialize(node, &info, path)?))
            }
            FieldKind::Key(name) => {
                let builder = match node {
                    Node::Map(_) => self.decode_record(node, Some(name), path)?,
                    _ => self
                        .config
                        .keys
                        .unwrap_or_else(KeySerializer::delimited)
                        .deserialize(node, name, &self.key_context(), path)?,
                };
                Ok(Value::from(builder))
            }
            FieldKind::Data(name) => Ok(Value::from(self.decode_record(node, Some(name), path)?)),
            FieldKind::Sequence(inner) => {
                let items = node.as_seq().ok_or_else(|| {
                    Error::structural(
                        path,
                        format!("expected a sequence, found {}", node.kind_name()),
                    )
                })?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item_path = index_path(path, i);
                        if item.is_null() {
                            return Err(Error::structural(&item_path, "null element"));
                        }
                        self.decode_value(item, inner, &item_path)
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Sequence)
            }
            FieldKind::Mapping(inner) => {
                let entries = node.as_map().ok_or_else(|| {
                    Error::structural(
                        path,
                        format!("expected a mapping, found {}", node.kind_name()),
                    )
                })?;
                let mut values = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    let item_path = entry_path(path, key);
                    if item.is_null() {
                        return Err(Error::structural(&item_path, "null entry"));
                    }
                    let value = self.decode_value(item, inner, &item_path)?;
                    values.insert(key.clone(), value);
                }
                Ok(Value::Mapping(values))
            }
        }
    }
}

fn frozen(data: &DataRef, path: &str) -> Result<Record> {
    data.record()
        .ok_or_else(|| Error::structural(path, "nested record is not built"))
}
