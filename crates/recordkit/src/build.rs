// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Build orchestration: freeze a record graph bottom-up.
//!
//! For every record, owned nested records are built first (post-order), then
//! defaults are applied, init hooks run from base to derived type, children
//! introduced by the hooks are built, the instance is validated and finally
//! frozen. A nested cell reached a second time is already frozen and is
//! reused as-is; a cell reached again while it is still being built is a
//! cycle.

use crate::error::{entry_path, field_path, index_path, Error, Result};
use crate::record::{DataRef, Record, RecordBuilder};
use crate::schema::{FieldKind, PrimitiveKind};
use crate::value::Value;

/// Build `builder` and everything it owns.
pub(crate) fn build_record(builder: RecordBuilder) -> Result<Record> {
    let mut ctx = BuildContext::default();
    ctx.build(builder, "")
}

#[derive(Default)]
struct BuildContext {
    /// Cells currently being built, outermost first.
    in_progress: Vec<usize>,
}

impl BuildContext {
    fn build(&mut self, mut builder: RecordBuilder, path: &str) -> Result<Record> {
        let info = builder.type_info().clone();
        log::trace!("[build] {} at '{}'", info.name(), path);

        self.build_children(&builder, path)?;

        for (index, spec) in info.fields().iter().enumerate() {
            if let Some(default) = &spec.default {
                builder.fill_default(index, default);
            }
        }

        if !info.hooks().is_empty() {
            for hook in info.hooks() {
                hook(&mut builder).map_err(|source| Error::Hook {
                    type_name: info.name().to_string(),
                    path: path.to_string(),
                    source: Box::new(source),
                })?;
            }
            // Hooks may attach new nested records
            self.build_children(&builder, path)?;
        }

        validate(&builder, path)?;
        Ok(Record::freeze(builder))
    }

    fn build_children(&mut self, builder: &RecordBuilder, path: &str) -> Result<()> {
        for (spec, value) in builder.fields() {
            if let Some(value) = value {
                if spec.kind.may_contain_data() {
                    self.build_value(value, &field_path(path, &spec.name))?;
                }
            }
        }
        Ok(())
    }

    fn build_value(&mut self, value: &Value, path: &str) -> Result<()> {
        match value {
            Value::Data(data) => self.build_ref(data, path).map(|_| ()),
            Value::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.build_value(item, &index_path(path, i))?;
                }
                Ok(())
            }
            Value::Mapping(entries) => {
                for (key, item) in entries {
                    self.build_value(item, &entry_path(path, key))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn build_ref(&mut self, data: &DataRef, path: &str) -> Result<Record> {
        let id = data.id();
        if self.in_progress.contains(&id) {
            return Err(Error::CyclicOwnership {
                type_name: data.type_name(),
                path: path.to_string(),
            });
        }
        let builder = match data.open_snapshot() {
            Some(builder) => builder,
            None => {
                if let Some(record) = data.record() {
                    return Ok(record);
                }
                return Err(Error::structural(path, "nested cell has no contents"));
            }
        };

        self.in_progress.push(id);
        let result = self.build(builder, path);
        self.in_progress.pop();

        Ok(data.install(result?))
    }
}

// ----------------------------------------------------------------------------
// Validation
// ----------------------------------------------------------------------------

fn validate(builder: &RecordBuilder, path: &str) -> Result<()> {
    let info = builder.type_info();
    if info.is_abstract() {
        return Err(Error::Validation {
            type_name: info.name().to_string(),
            path: path.to_string(),
            reason: "abstract type cannot be built".to_string(),
        });
    }

    for (spec, value) in builder.fields() {
        let fpath = field_path(path, &spec.name);
        match value {
            None if spec.optional => {}
            None => {
                return Err(Error::MissingField {
                    type_name: info.name().to_string(),
                    field: spec.name.clone(),
                    path: fpath,
                })
            }
            Some(value) => check_kind(info.name(), &spec.kind, value, &fpath)?,
        }
    }
    Ok(())
}

fn primitive_matches(kind: PrimitiveKind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (PrimitiveKind::Bool, Value::Bool(_))
            | (PrimitiveKind::Int, Value::Int(_))
            | (PrimitiveKind::Long, Value::Long(_))
            | (PrimitiveKind::Float, Value::Float(_))
            | (PrimitiveKind::String, Value::String(_))
            | (PrimitiveKind::Date, Value::Date(_))
            | (PrimitiveKind::Time, Value::Time(_))
            | (PrimitiveKind::DateTime, Value::DateTime(_))
            | (PrimitiveKind::Uuid, Value::Uuid(_))
            | (PrimitiveKind::Bytes, Value::Bytes(_))
    )
}

fn check_kind(type_name: &str, kind: &FieldKind, value: &Value, path: &str) -> Result<()> {
    let wrong_kind = || Error::Validation {
        type_name: type_name.to_string(),
        path: path.to_string(),
        reason: format!("expected {}, got {}", kind, value.kind_name()),
    };

    match (kind, value) {
        (FieldKind::Primitive(p), v) if primitive_matches(*p, v) => Ok(()),
        (FieldKind::Enum(name), Value::Enum(e)) if e.type_name == *name => Ok(()),
        (FieldKind::Key(name), Value::Data(data)) => {
            let actual = data.type_info();
            if actual.is_key() && actual.is_subtype_of(name) {
                Ok(())
            } else {
                Err(Error::TypeMismatch {
                    path: path.to_string(),
                    expected: name.clone(),
                    actual: actual.name().to_string(),
                })
            }
        }
        (FieldKind::Data(name), Value::Data(data)) => {
            let actual = data.type_info();
            if actual.is_subtype_of(name) {
                Ok(())
            } else {
                Err(Error::TypeMismatch {
                    path: path.to_string(),
                    expected: name.clone(),
                    actual: actual.name().to_string(),
                })
            }
        }
        (FieldKind::Sequence(inner), Value::Sequence(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_kind(type_name, inner, item, &index_path(path, i))?;
            }
            Ok(())
        }
        (FieldKind::Mapping(inner), Value::Mapping(entries)) => {
            for (key, item) in entries {
                check_kind(type_name, inner, item, &entry_path(path, key))?;
            }
            Ok(())
        }
        _ => Err(wrong_kind()),
    }
}
