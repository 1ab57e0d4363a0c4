// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hashable handles on frozen keys.

use crate::error::{field_path, Error, Result};
use crate::record::Record;
use crate::schema::FieldKind;
use crate::serializer::format_token;
use crate::value::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A frozen key record usable in `HashMap` and `HashSet`.
///
/// Equality and hashing use the flattened key: runtime type names and field
/// tokens, depth first. Two keys built separately from the same values are
/// equal.
#[derive(Clone)]
pub struct RecordKey {
    record: Record,
    tokens: Arc<[String]>,
}

impl RecordKey {
    /// Wrap a frozen record of a key type.
    pub fn new(record: Record) -> Result<Self> {
        if !record.type_info().is_key() {
            return Err(Error::validation(
                record.type_name(),
                "only key types can be hashed",
            ));
        }
        let mut tokens = Vec::new();
        push_tokens(&record, "", &mut tokens)?;
        Ok(Self {
            record,
            tokens: tokens.into(),
        })
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn type_name(&self) -> &str {
        self.record.type_name()
    }

    /// Flattened key, the runtime type name first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

fn push_tokens(record: &Record, path: &str, tokens: &mut Vec<String>) -> Result<()> {
    tokens.push(record.type_name().to_string());
    for spec in record.type_info().fields() {
        let fpath = field_path(path, &spec.name);
        let value = record
            .get(&spec.name)
            .ok_or_else(|| Error::structural(&fpath, "key field is not set"))?;
        match (&spec.kind, value) {
            (FieldKind::Primitive(kind), value) => tokens.push(format_token(value, *kind, &fpath)?),
            (FieldKind::Enum(_), Value::Enum(item)) => tokens.push(item.item.clone()),
            (FieldKind::Key(_), Value::Data(data)) => {
                let nested = data
                    .record()
                    .ok_or_else(|| Error::structural(&fpath, "nested key is not frozen"))?;
                push_tokens(&nested, &fpath, tokens)?;
            }
            (kind, value) => {
                return Err(Error::TypeMismatch {
                    path: fpath,
                    expected: kind.to_string(),
                    actual: value.kind_name(),
                })
            }
        }
    }
    Ok(())
}

impl TryFrom<Record> for RecordKey {
    type Error = Error;

    fn try_from(record: Record) -> Result<Self> {
        Self::new(record)
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for RecordKey {}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(";"))
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordKey({})", self)
    }
}
