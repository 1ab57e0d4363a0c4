// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field values held by records.

use crate::error::{Error, Result};
use crate::record::{DataRef, Record, RecordBuilder};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

/// Enum item together with its enum type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Canonical enum type name.
    pub type_name: String,
    /// Item name as declared (UPPER_CASE).
    pub item: String,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            item: item.into(),
        }
    }
}

/// A field value. An unset field has no value at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Primitives
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
    Bytes(Vec<u8>),

    Enum(EnumValue),

    // Nested record, shared by reference
    Data(DataRef),

    // Containers
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Short description of the runtime kind, for messages.
    pub fn kind_name(&self) -> String {
        match self {
            Self::Bool(_) => "bool".into(),
            Self::Int(_) => "int".into(),
            Self::Long(_) => "long".into(),
            Self::Float(_) => "float".into(),
            Self::String(_) => "str".into(),
            Self::Date(_) => "date".into(),
            Self::Time(_) => "time".into(),
            Self::DateTime(_) => "datetime".into(),
            Self::Uuid(_) => "uuid".into(),
            Self::Bytes(_) => "bytes".into(),
            Self::Enum(e) => e.type_name.clone(),
            Self::Data(d) => d.type_name().to_string(),
            Self::Sequence(_) => "list".into(),
            Self::Mapping(_) => "dict".into(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer value, widening `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            Self::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&DataRef> {
        match self {
            Self::Data(v) => Some(v),
            _ => None,
        }
    }

    /// Nested record, if present and frozen.
    pub fn as_record(&self) -> Option<Record> {
        self.as_data().and_then(DataRef::record)
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Mapping(v) => Some(v),
            _ => None,
        }
    }
}

// Conversion traits
macro_rules! impl_from_value {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_value!(bool, Bool);
impl_from_value!(i32, Int);
impl_from_value!(i64, Long);
impl_from_value!(f64, Float);
impl_from_value!(String, String);
impl_from_value!(NaiveDate, Date);
impl_from_value!(NaiveTime, Time);
impl_from_value!(DateTime<Utc>, DateTime);
impl_from_value!(Uuid, Uuid);
impl_from_value!(EnumValue, Enum);
impl_from_value!(DataRef, Data);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<RecordBuilder> for Value {
    fn from(v: RecordBuilder) -> Self {
        Self::Data(DataRef::new(v))
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Data(DataRef::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<IndexMap<String, T>> for Value {
    fn from(v: IndexMap<String, T>) -> Self {
        Self::Mapping(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Typed extraction of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch(expected: &str, value: &Value) -> Error {
    Error::TypeMismatch {
        path: String::new(),
        expected: expected.to_string(),
        actual: value.kind_name(),
    }
}

macro_rules! impl_typed_get {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch($name, other)),
                }
            }
        }
    };
}

impl_typed_get!(bool, Bool, "bool");
impl_typed_get!(i32, Int, "int");
impl_typed_get!(f64, Float, "float");
impl_typed_get!(String, String, "str");
impl_typed_get!(NaiveDate, Date, "date");
impl_typed_get!(NaiveTime, Time, "time");
impl_typed_get!(DateTime<Utc>, DateTime, "datetime");
impl_typed_get!(Uuid, Uuid, "uuid");
impl_typed_get!(Vec<u8>, Bytes, "bytes");
impl_typed_get!(EnumValue, Enum, "enum");

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| mismatch("long", value))
    }
}

impl FromValue for Record {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_record().ok_or_else(|| mismatch("frozen record", value))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Sequence(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch("list", other)),
        }
    }
}
