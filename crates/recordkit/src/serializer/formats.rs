// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON and YAML text for serialized trees, and file helpers.

use super::data::DataSerializer;
use super::tree::Node;
use crate::error::Result;
use crate::record::{Record, RecordBuilder};
use std::path::Path;

/// Text format of a serialized tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Json,
    Yaml,
}

impl TextFormat {
    /// Format implied by a file extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    pub fn parse(&self, text: &str) -> Result<Node> {
        match self {
            Self::Json => Ok(serde_json::from_str(text)?),
            Self::Yaml => Ok(serde_yaml::from_str(text)?),
        }
    }

    pub fn write(&self, node: &Node) -> Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(node)?),
            Self::Yaml => Ok(serde_yaml::to_string(node)?),
        }
    }
}

impl DataSerializer {
    /// Serialize a record to pretty-printed JSON.
    pub fn to_json(&self, record: &Record) -> Result<String> {
        TextFormat::Json.write(&self.serialize(record)?)
    }

    /// Read a record from JSON text.
    pub fn read_json(&self, text: &str, type_hint: Option<&str>) -> Result<RecordBuilder> {
        self.deserialize(&TextFormat::Json.parse(text)?, type_hint)
    }

    /// Serialize a record to YAML.
    pub fn to_yaml(&self, record: &Record) -> Result<String> {
        TextFormat::Yaml.write(&self.serialize(record)?)
    }

    /// Read a record from YAML text.
    pub fn read_yaml(&self, text: &str, type_hint: Option<&str>) -> Result<RecordBuilder> {
        self.deserialize(&TextFormat::Yaml.parse(text)?, type_hint)
    }

    /// Write a record to `path`, choosing the format from its extension.
    pub fn write_file<P: AsRef<Path>>(&self, record: &Record, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = TextFormat::from_path(path).write(&self.serialize(record)?)?;
        std::fs::write(path, text)?;
        log::debug!("[serializer] wrote {} to {}", record.type_name(), path.display());
        Ok(())
    }

    /// Read a record from `path`.
    ///
    /// When the file stem names a registered type (`trade_order.yaml` names
    /// `TradeOrder`) it is used as the type hint.
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<RecordBuilder> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let node = TextFormat::from_path(path).parse(&text)?;
        let hint = self.registry().resolve_file_hint(path).ok();
        log::debug!(
            "[serializer] reading {} (hint {:?})",
            path.display(),
            hint.as_ref().map(|info| info.name())
        );
        self.deserialize(&node, hint.as_ref().map(|info| info.name()))
    }
}
