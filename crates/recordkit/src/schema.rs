// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptions: field descriptor sets, type descriptors and enums.
//!
//! A [`TypeInfo`] is assembled once through [`TypeInfoBuilder`]. At that point
//! the inherited fields are flattened (base fields first, in declaration order)
//! and the chain of init hooks is fixed, so neither the build orchestrator nor
//! the serializers ever walk the parent chain to discover fields.

use crate::error::{Error, Result};
use crate::record::RecordBuilder;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Per-type initialization hook, run by `build()` from base to derived type.
///
/// A hook may fill in fields, derive computed fields and reject the instance
/// by returning an error. Nested records are already frozen when it runs.
pub type InitHook = Arc<dyn Fn(&mut RecordBuilder) -> Result<()> + Send + Sync>;

/// Primitive leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    Float,
    String,
    Date,
    Time,
    /// UTC timestamp.
    DateTime,
    Uuid,
    Bytes,
}

impl PrimitiveKind {
    /// Lower-case name used in messages and descriptors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::String => "str",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
            Self::Bytes => "bytes",
        }
    }
}

/// Declared kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Primitive(PrimitiveKind),
    /// Enum type, by canonical name.
    Enum(String),
    /// Reference to another record by key, by key type name.
    Key(String),
    /// Owned nested data, by declared (static) type name.
    Data(String),
    /// Ordered sequence.
    Sequence(Box<FieldKind>),
    /// String-keyed mapping, insertion order preserved.
    Mapping(Box<FieldKind>),
}

impl FieldKind {
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    pub fn enumeration(type_name: impl Into<String>) -> Self {
        Self::Enum(type_name.into())
    }

    pub fn key(type_name: impl Into<String>) -> Self {
        Self::Key(type_name.into())
    }

    pub fn data(type_name: impl Into<String>) -> Self {
        Self::Data(type_name.into())
    }

    pub fn sequence(element: FieldKind) -> Self {
        Self::Sequence(Box::new(element))
    }

    pub fn mapping(value: FieldKind) -> Self {
        Self::Mapping(Box::new(value))
    }

    /// True for kinds that may appear inside a key type.
    pub fn is_key_compatible(&self) -> bool {
        matches!(self, Self::Primitive(_) | Self::Enum(_) | Self::Key(_))
    }

    /// True if values of this kind can contain nested records.
    pub fn may_contain_data(&self) -> bool {
        match self {
            Self::Primitive(_) | Self::Enum(_) => false,
            Self::Key(_) | Self::Data(_) => true,
            Self::Sequence(inner) | Self::Mapping(inner) => inner.may_contain_data(),
        }
    }
}

impl From<PrimitiveKind> for FieldKind {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Enum(name) | Self::Key(name) | Self::Data(name) => f.write_str(name),
            Self::Sequence(inner) => write!(f, "list[{}]", inner),
            Self::Mapping(inner) => write!(f, "dict[str, {}]", inner),
        }
    }
}

/// Descriptor of a single public field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Declared field name.
    pub name: String,
    /// Declared kind.
    pub kind: FieldKind,
    /// Whether the field may be left unset.
    pub optional: bool,
    /// Name used by formats that serialize aliases instead of declared names.
    pub alias: Option<String>,
    /// Free-form formatting hint for presentation layers.
    pub format: Option<String>,
    /// Sort in descending order when listing by this field.
    pub descending: bool,
    /// Value applied at build time when the field is unset.
    pub default: Option<Value>,
}

impl FieldSpec {
    /// Create a required field.
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            optional: false,
            alias: None,
            format: None,
            descending: false,
            default: None,
        }
    }

    /// Mark as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set the external alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the formatting hint.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Mark the sort direction as descending.
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    /// Set a default applied when the field is unset at build time.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Role of a type in the record model.
#[derive(Debug, Clone)]
pub enum TypeCategory {
    /// Plain data, owned by its parent.
    Data,
    /// Key: primitive, enum and key fields only; used for references.
    Key,
    /// Record identified by the fields of its key type.
    Record { key: Arc<TypeInfo> },
}

/// Type descriptor with its flattened field descriptor set.
pub struct TypeInfo {
    name: String,
    category: TypeCategory,
    is_abstract: bool,
    parent: Option<Arc<TypeInfo>>,
    fields: Vec<FieldSpec>,
    hooks: Vec<InitHook>,
}

impl TypeInfo {
    /// Start declaring a type.
    pub fn builder(name: impl Into<String>) -> TypeInfoBuilder {
        TypeInfoBuilder::new(name)
    }

    /// Canonical type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &TypeCategory {
        &self.category
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_key(&self) -> bool {
        matches!(self.category, TypeCategory::Key)
    }

    /// Key type of a record type.
    pub fn key_type(&self) -> Option<&Arc<TypeInfo>> {
        match &self.category {
            TypeCategory::Record { key } => Some(key),
            _ => None,
        }
    }

    /// Direct parent type.
    pub fn parent(&self) -> Option<&Arc<TypeInfo>> {
        self.parent.as_ref()
    }

    /// All public fields, base fields first.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field by declared name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field index by declared name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Init hooks from most-base to most-derived type.
    pub(crate) fn hooks(&self) -> &[InitHook] {
        &self.hooks
    }

    /// Names of this type and its ancestors, most-derived first.
    pub fn lineage(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        let mut current = self.parent.as_deref();
        while let Some(info) = current {
            names.push(info.name.as_str());
            current = info.parent.as_deref();
        }
        names
    }

    /// True if this type is `type_name` or derives from it.
    pub fn is_subtype_of(&self, type_name: &str) -> bool {
        self.lineage().contains(&type_name)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("is_abstract", &self.is_abstract)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("fields", &self.fields)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Fluent builder for [`TypeInfo`].
pub struct TypeInfoBuilder {
    name: String,
    category: Option<TypeCategory>,
    is_abstract: bool,
    parent: Option<Arc<TypeInfo>>,
    fields: Vec<FieldSpec>,
    hook: Option<InitHook>,
}

impl TypeInfoBuilder {
    /// Create a new builder for a data type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            is_abstract: false,
            parent: None,
            fields: Vec::new(),
            hook: None,
        }
    }

    /// Derive from `parent`, inheriting its fields, hooks and category.
    pub fn extends(mut self, parent: &Arc<TypeInfo>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Declare a key type.
    pub fn key(mut self) -> Self {
        self.category = Some(TypeCategory::Key);
        self
    }

    /// Declare a record type identified by `key`.
    pub fn record(mut self, key: &Arc<TypeInfo>) -> Self {
        self.category = Some(TypeCategory::Record { key: key.clone() });
        self
    }

    /// Declare the type abstract (never instantiated directly).
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add a field.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Add a required primitive field.
    pub fn primitive(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field(FieldSpec::new(name, kind))
    }

    /// Add an optional primitive field.
    pub fn optional(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field(FieldSpec::new(name, kind).optional())
    }

    /// Add a required string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.primitive(name, PrimitiveKind::String)
    }

    /// Add an optional nested data field.
    pub fn data_field(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field(FieldSpec::new(name, FieldKind::data(type_name)).optional())
    }

    /// Add an optional sequence field.
    pub fn sequence_field(self, name: impl Into<String>, element: FieldKind) -> Self {
        self.field(FieldSpec::new(name, FieldKind::sequence(element)).optional())
    }

    /// Set the init hook of this type.
    pub fn init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RecordBuilder) -> Result<()> + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Build the TypeInfo, flattening inherited fields and hooks.
    pub fn build(self) -> Result<TypeInfo> {
        if self.name.is_empty() {
            return Err(Error::schema("<unnamed>", "type name is empty"));
        }

        let (mut fields, mut hooks) = match &self.parent {
            Some(parent) => (parent.fields.clone(), parent.hooks.clone()),
            None => (Vec::new(), Vec::new()),
        };

        for spec in self.fields {
            if spec.name.is_empty() || spec.name.starts_with('_') {
                return Err(Error::schema(
                    &self.name,
                    format!("'{}' is not a valid public field name", spec.name),
                ));
            }
            if fields.iter().any(|f| f.name == spec.name) {
                return Err(Error::schema(
                    &self.name,
                    format!("field '{}' is declared more than once", spec.name),
                ));
            }
            fields.push(spec);
        }
        hooks.extend(self.hook);

        let category = match (self.category, &self.parent) {
            (Some(category), _) => category,
            (None, Some(parent)) => parent.category.clone(),
            (None, None) => TypeCategory::Data,
        };

        match &category {
            TypeCategory::Key => {
                for spec in &fields {
                    if !spec.kind.is_key_compatible() {
                        return Err(Error::schema(
                            &self.name,
                            format!("key field '{}' has non-key kind {}", spec.name, spec.kind),
                        ));
                    }
                    if spec.optional {
                        return Err(Error::schema(
                            &self.name,
                            format!("key field '{}' cannot be optional", spec.name),
                        ));
                    }
                }
            }
            TypeCategory::Record { key } => {
                for key_field in key.fields() {
                    match fields.iter().find(|f| f.name == key_field.name) {
                        Some(f) if f.kind == key_field.kind => {}
                        _ => {
                            return Err(Error::schema(
                                &self.name,
                                format!(
                                    "key field '{}' of {} is not declared with kind {}",
                                    key_field.name,
                                    key.name(),
                                    key_field.kind
                                ),
                            ))
                        }
                    }
                }
            }
            TypeCategory::Data => {}
        }

        Ok(TypeInfo {
            name: self.name,
            category,
            is_abstract: self.is_abstract,
            parent: self.parent,
            fields,
            hooks,
        })
    }
}

/// Enum type descriptor; items are declared in UPPER_CASE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    name: String,
    items: Vec<String>,
}

impl EnumInfo {
    pub fn new<I, S>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Declaration index of `item`.
    pub fn ordinal(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    /// Item at declaration index `ordinal`.
    pub fn item(&self, ordinal: usize) -> Option<&str> {
        self.items.get(ordinal).map(String::as_str)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.ordinal(item).is_some()
    }
}
