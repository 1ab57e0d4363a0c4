// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Composite key serializer.
//!
//! A key is flattened depth-first into text tokens: primitive and enum
//! fields become one token each, nested keys are expanded in place. When the
//! declared key type is abstract the concrete type name is written first so
//! that the key can be read back.

use super::enums::EnumSerializer;
use super::primitive::{format_token, parse_token};
use super::tree::Node;
use crate::error::{field_path, Error, Result};
use crate::record::{DataRef, Record, RecordBuilder};
use crate::registry::TypeRegistry;
use crate::schema::FieldKind;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Separator of [`KeyFormat::Delimited`] keys.
pub const KEY_DELIMITER: char = ';';

/// Layout of a flattened key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFormat {
    /// Tokens joined with [`KEY_DELIMITER`] into one string.
    Delimited,
    /// Tokens as a sequence of strings.
    Tuple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySerializer {
    pub format: KeyFormat,
}

/// Lookups a key serializer needs from its owner.
pub(crate) struct KeyContext<'a> {
    pub registry: &'a TypeRegistry,
    pub enums: &'a EnumSerializer,
}

impl KeySerializer {
    pub fn delimited() -> Self {
        Self {
            format: KeyFormat::Delimited,
        }
    }

    pub fn tuple() -> Self {
        Self {
            format: KeyFormat::Tuple,
        }
    }

    pub(crate) fn serialize(
        &self,
        key: &Record,
        declared: &str,
        ctx: &KeyContext<'_>,
        path: &str,
    ) -> Result<Node> {
        let mut tokens = Vec::new();
        push_tokens(key, declared, ctx, path, &mut tokens)?;

        match self.format {
            KeyFormat::Delimited => {
                if let Some(bad) = tokens.iter().find(|t| t.contains(KEY_DELIMITER)) {
                    return Err(Error::Validation {
                        type_name: key.type_name().to_string(),
                        path: path.to_string(),
                        reason: format!("key token '{}' contains '{}'", bad, KEY_DELIMITER),
                    });
                }
                Ok(Node::String(tokens.join(&KEY_DELIMITER.to_string())))
            }
            KeyFormat::Tuple => Ok(Node::Seq(tokens.into_iter().map(Node::String).collect())),
        }
    }

    pub(crate) fn deserialize(
        &self,
        node: &Node,
        declared: &str,
        ctx: &KeyContext<'_>,
        path: &str,
    ) -> Result<RecordBuilder> {
        let mut tokens: VecDeque<String> = match node {
            Node::String(text) => text.split(KEY_DELIMITER).map(str::to_string).collect(),
            Node::Seq(items) => items
                .iter()
                .map(|item| scalar_token(item, path))
                .collect::<Result<_>>()?,
            other => {
                return Err(Error::structural(
                    path,
                    format!("expected a key, found {}", other.kind_name()),
                ))
            }
        };

        let builder = pop_key(&mut tokens, declared, ctx, path)?;
        // "" splits into one empty token, which a key without fields leaves behind
        let blank = matches!(node, Node::String(text) if text.is_empty());
        if blank && tokens.len() == 1 && tokens[0].is_empty() {
            tokens.clear();
        }
        if !tokens.is_empty() {
            return Err(Error::structural(
                path,
                format!("{} unused key token(s)", tokens.len()),
            ));
        }
        Ok(builder)
    }
}

fn scalar_token(node: &Node, path: &str) -> Result<String> {
    match node {
        Node::String(s) => Ok(s.clone()),
        Node::Int(i) => Ok(i.to_string()),
        Node::Float(f) => Ok(f.to_string()),
        Node::Bool(b) => Ok(if *b { "Y" } else { "N" }.to_string()),
        other => Err(Error::structural(
            path,
            format!("{} is not a key token", other.kind_name()),
        )),
    }
}

fn push_tokens(
    key: &Record,
    declared: &str,
    ctx: &KeyContext<'_>,
    path: &str,
    tokens: &mut Vec<String>,
) -> Result<()> {
    let declared_info = ctx.registry.resolve(declared)?;
    let runtime = key.type_info();
    if !runtime.is_key() || !runtime.is_subtype_of(declared_info.name()) {
        return Err(Error::TypeMismatch {
            path: path.to_string(),
            expected: declared_info.name().to_string(),
            actual: runtime.name().to_string(),
        });
    }
    if declared_info.is_abstract() {
        tokens.push(runtime.name().to_string());
    } else if runtime.name() != declared_info.name() {
        return Err(Error::Validation {
            type_name: runtime.name().to_string(),
            path: path.to_string(),
            reason: format!(
                "key field declared as concrete {} cannot hold a subtype",
                declared_info.name()
            ),
        });
    }

    for (spec, value) in key.fields() {
        let fpath = field_path(path, &spec.name);
        match (&spec.kind, value) {
            (FieldKind::Primitive(kind), value) => tokens.push(format_token(value, *kind, &fpath)?),
            (FieldKind::Enum(name), Value::Enum(item)) => {
                let info = ctx.registry.resolve_enum(name)?;
                tokens.push(ctx.enums.token(item, &info, &fpath)?);
            }
            (FieldKind::Key(name), Value::Data(data)) => {
                let nested = data
                    .record()
                    .ok_or_else(|| Error::structural(&fpath, "nested key is not frozen"))?;
                push_tokens(&nested, name, ctx, &fpath, tokens)?;
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

fn pop_token(tokens: &mut VecDeque<String>, path: &str) -> Result<String> {
    tokens
        .pop_front()
        .ok_or_else(|| Error::structural(path, "key has too few tokens"))
}

fn pop_key(
    tokens: &mut VecDeque<String>,
    declared: &str,
    ctx: &KeyContext<'_>,
    path: &str,
) -> Result<RecordBuilder> {
    let declared_info = ctx.registry.resolve(declared)?;
    let info = if declared_info.is_abstract() {
        let name = pop_token(tokens, path)?;
        let runtime = ctx.registry.resolve(&name)?;
        if !runtime.is_subtype_of(declared_info.name()) {
            return Err(Error::TypeMismatch {
                path: path.to_string(),
                expected: declared_info.name().to_string(),
                actual: runtime.name().to_string(),
            });
        }
        runtime
    } else {
        declared_info
    };

    let mut builder = RecordBuilder::new(&info);
    for (index, spec) in info.fields().iter().enumerate() {
        let fpath = field_path(path, &spec.name);
        let value = match &spec.kind {
            FieldKind::Primitive(kind) => parse_token(&pop_token(tokens, &fpath)?, *kind, &fpath)?,
            FieldKind::Enum(name) => {
                let enum_info = ctx.registry.resolve_enum(name)?;
                let token = Node::String(pop_token(tokens, &fpath)?);
                Value::Enum(ctx.enums.deserialize(&token, &enum_info, &fpath)?)
            }
            FieldKind::Key(name) => Value::Data(DataRef::new(pop_key(tokens, name, ctx, &fpath)?)),
            other => {
                return Err(Error::schema(
                    info.name(),
                    format!("{} cannot appear in a key", other),
                ))
            }
        };
        builder.set_slot(index, value);
    }
    Ok(builder)
}
