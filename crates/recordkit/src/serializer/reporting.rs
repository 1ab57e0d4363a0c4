// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One-way report output.
//!
//! Reports are read by people and spreadsheets, not by this crate: no type
//! tags are written, keys are PascalCase by default, and empty values are
//! left out. Sequence positions are kept, so an empty element becomes null.

use super::config::KeyCase;
use super::enums::EnumSerializer;
use super::primitive::PrimitiveSerializer;
use super::tree::Node;
use crate::case::snake_to_pascal;
use crate::error::{entry_path, field_path, index_path, Error, Result};
use crate::record::Record;
use crate::registry::TypeRegistry;
use crate::schema::FieldKind;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Writes untagged report trees. There is no way back.
#[derive(Clone)]
pub struct ReportingSerializer {
    registry: Arc<TypeRegistry>,
    key_case: KeyCase,
    primitive: PrimitiveSerializer,
    enums: EnumSerializer,
}

impl fmt::Debug for ReportingSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportingSerializer")
            .field("key_case", &self.key_case)
            .field("primitive", &self.primitive)
            .field("enums", &self.enums)
            .finish_non_exhaustive()
    }
}

impl ReportingSerializer {
    /// PascalCase keys, JSON leaves.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            key_case: KeyCase::Pascal,
            primitive: PrimitiveSerializer::json(),
            enums: EnumSerializer::default(),
        }
    }

    pub fn with_key_case(mut self, case: KeyCase) -> Self {
        self.key_case = case;
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

    /// Report a frozen record. Always returns a mapping, possibly empty.
    pub fn serialize(&self, record: &Record) -> Result<Node> {
        self.primitive.validate()?;
        self.encode_record(record, "")
    }

    /// Report a frozen record as pretty JSON.
    pub fn to_json(&self, record: &Record) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize(record)?)?)
    }

    fn output_key(&self, name: &str) -> String {
        match self.key_case {
            KeyCase::Declared => name.to_string(),
            KeyCase::Pascal => snake_to_pascal(name),
        }
    }

    fn encode_record(&self, record: &Record, path: &str) -> Result<Node> {
        let mut map = IndexMap::new();
        for (spec, value) in record.fields() {
            let fpath = field_path(path, &spec.name);
            if let Some(node) = self.encode_value(value, &spec.kind, &fpath)? {
                map.insert(self.output_key(&spec.name), node);
            }
        }
        Ok(Node::Map(map))
    }

    /// `None` when the value reports as empty.
    fn encode_value(&self, value: &Value, kind: &FieldKind, path: &str) -> Result<Option<Node>> {
        let node = match (kind, value) {
            (FieldKind::Primitive(p), value) => self.primitive.serialize(value, *p, path)?,
            (FieldKind::Enum(name), Value::Enum(item)) => {
                let info = self.registry.resolve_enum(name)?;
                self.enums.serialize(item, &info, path)?
            }
            (FieldKind::Key(_) | FieldKind::Data(_), Value::Data(data)) => {
                let record = data
                    .record()
                    .ok_or_else(|| Error::structural(path, "nested record is not built"))?;
                self.encode_record(&record, path)?
            }
            (FieldKind::Sequence(inner), Value::Sequence(items)) => {
                let mut nodes = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let node = self.encode_value(item, inner, &index_path(path, i))?;
                    nodes.push(node.unwrap_or(Node::Null));
                }
                Node::Seq(nodes)
            }
            (FieldKind::Mapping(inner), Value::Mapping(entries)) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    if let Some(node) = self.encode_value(item, inner, &entry_path(path, key))? {
                        map.insert(key.clone(), node);
                    }
                }
                Node::Map(map)
            }
            (kind, value) => {
                return Err(Error::TypeMismatch {
                    path: path.to_string(),
                    expected: kind.to_string(),
                    actual: value.kind_name(),
                })
            }
        };
        Ok(match &node {
            Node::Seq(items) if items.is_empty() => None,
            Node::Map(entries) if entries.is_empty() => None,
            _ => Some(node),
        })
    }
}
