// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum leaf serializer.

use super::tree::Node;
use crate::case::upper_to_pascal;
use crate::error::{Error, Result};
use crate::schema::EnumInfo;
use crate::value::EnumValue;
use serde::{Deserialize, Serialize};

/// Representation of an enum item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumFormat {
    /// `FOO_BAR` is written as `FooBar`.
    #[default]
    Pascal,
    /// Item name as declared.
    Declared,
    /// Declaration index.
    Ordinal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumSerializer {
    pub format: EnumFormat,
}

impl EnumSerializer {
    pub fn new(format: EnumFormat) -> Self {
        Self { format }
    }

    fn ordinal(&self, value: &EnumValue, info: &EnumInfo, path: &str) -> Result<usize> {
        if value.type_name != info.name() {
            return Err(Error::TypeMismatch {
                path: path.to_string(),
                expected: info.name().to_string(),
                actual: value.type_name.clone(),
            });
        }
        info.ordinal(&value.item).ok_or_else(|| Error::Validation {
            type_name: info.name().to_string(),
            path: path.to_string(),
            reason: format!("'{}' is not an item of {}", value.item, info.name()),
        })
    }

    pub fn serialize(&self, value: &EnumValue, info: &EnumInfo, path: &str) -> Result<Node> {
        let ordinal = self.ordinal(value, info, path)?;
        Ok(match self.format {
            EnumFormat::Pascal => Node::String(upper_to_pascal(&value.item)),
            EnumFormat::Declared => Node::String(value.item.clone()),
            EnumFormat::Ordinal => Node::Int(ordinal as i64),
        })
    }

    /// Text form, used inside composite keys.
    pub(crate) fn token(&self, value: &EnumValue, info: &EnumInfo, path: &str) -> Result<String> {
        Ok(match self.serialize(value, info, path)? {
            Node::Int(ordinal) => ordinal.to_string(),
            Node::String(s) => s,
            other => return Err(Error::structural(path, format!("unexpected {}", other.kind_name()))),
        })
    }

    /// Decode an item written in any enum format.
    pub fn deserialize(&self, node: &Node, info: &EnumInfo, path: &str) -> Result<EnumValue> {
        let item = match node {
            Node::String(text) => info
                .items()
                .iter()
                .find(|item| *item == text || upper_to_pascal(item) == *text)
                .map(String::as_str)
                .or_else(|| text.parse::<usize>().ok().and_then(|i| info.item(i))),
            Node::Int(ordinal) => usize::try_from(*ordinal).ok().and_then(|i| info.item(i)),
            _ => None,
        };
        item.map(|item| EnumValue::new(info.name(), item))
            .ok_or_else(|| {
                Error::structural(
                    path,
                    format!("{} is not an item of {}", describe(node), info.name()),
                )
            })
    }
}

fn describe(node: &Node) -> String {
    match node {
        Node::String(s) => format!("'{}'", s),
        Node::Int(i) => i.to_string(),
        other => other.kind_name().to_string(),
    }
}
