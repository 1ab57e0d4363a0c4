// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared by the build lifecycle and the serializers.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Write attempted on a frozen public field.
    Immutability,
    /// Required field missing or value of the wrong kind at build time.
    Validation,
    /// Type tag or hint does not resolve, or resolves to an incompatible type.
    TypeResolution,
    /// Malformed serialized tree.
    Structural,
    /// Ownership edges of a record graph form a cycle.
    CyclicOwnership,
    /// Invalid type declaration.
    Schema,
    /// Invalid serializer configuration.
    Config,
    /// Text format or I/O failure in the collaborator glue.
    Io,
}

/// Errors produced by records, the registry and the serializers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot set field '{field}' of {type_name}: instance is frozen")]
    Immutable { type_name: String, field: String },

    #[error("field '{field}' of {type_name} is required but not set (at '{path}')")]
    MissingField {
        type_name: String,
        field: String,
        path: String,
    },

    #[error("validation failed for {type_name} at '{path}': {reason}")]
    Validation {
        type_name: String,
        path: String,
        reason: String,
    },

    #[error("initialization of {type_name} failed at '{path}': {source}")]
    Hook {
        type_name: String,
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("type '{0}' not found")]
    TypeNotFound(String),

    #[error("no type tag '{tag}' and no type hint for the mapping at '{path}'")]
    MissingType { tag: String, path: String },

    #[error("type mismatch at '{path}': {actual} is not {expected} or its subtype")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("malformed data at '{path}': {reason}")]
    Structural { path: String, reason: String },

    #[error("cyclic ownership of {type_name} detected at '{path}'")]
    CyclicOwnership { type_name: String, path: String },

    #[error("invalid declaration of {type_name}: {reason}")]
    Schema { type_name: String, reason: String },

    #[error("invalid serializer configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Taxonomy bucket of this error.
    ///
    /// Hook failures report the kind of the error raised inside the hook.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Immutable { .. } => ErrorKind::Immutability,
            Self::MissingField { .. } | Self::Validation { .. } => ErrorKind::Validation,
            Self::Hook { source, .. } => source.kind(),
            Self::TypeNotFound(_) | Self::MissingType { .. } | Self::TypeMismatch { .. } => {
                ErrorKind::TypeResolution
            }
            Self::Structural { .. } => ErrorKind::Structural,
            Self::CyclicOwnership { .. } => ErrorKind::CyclicOwnership,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::Config(_) => ErrorKind::Config,
            Self::Json(_) | Self::Yaml(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Shorthand for a validation error, mostly used by init hooks.
    pub fn validation(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            type_name: type_name.into(),
            path: String::new(),
            reason: reason.into(),
        }
    }

    pub(crate) fn structural(path: &str, reason: impl Into<String>) -> Self {
        Self::Structural {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn schema(type_name: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Path of a named field below `parent`.
pub(crate) fn field_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

/// Path of a sequence element below `parent`.
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

/// Path of a mapping entry below `parent`.
pub(crate) fn entry_path(parent: &str, key: &str) -> String {
    format!("{}[\"{}\"]", parent, key)
}
