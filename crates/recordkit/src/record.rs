// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record instances: the mutable [`RecordBuilder`], the frozen [`Record`] and
//! the shared nested cell [`DataRef`].
//!
//! A builder only becomes a `Record` through `build()`, so "frozen" is a
//! property of the type rather than a flag that could be flipped back.
//! Nested records are held through `DataRef` cells. A cell is either still
//! open (holding a builder) or frozen (holding a record), and the transition
//! happens exactly once, when the enclosing graph is built.

use crate::error::{Error, Result};
use crate::key::RecordKey;
use crate::schema::{FieldKind, FieldSpec, PrimitiveKind, TypeCategory, TypeInfo};
use crate::value::{FromValue, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Anything that can report whether it is frozen.
pub trait Freezable {
    fn is_frozen(&self) -> bool;
}

fn is_internal(name: &str) -> bool {
    name.starts_with('_')
}

fn no_such_field(type_name: &str, field: &str) -> Error {
    Error::Validation {
        type_name: type_name.to_string(),
        path: field.to_string(),
        reason: format!("{} has no field '{}'", type_name, field),
    }
}

/// Widen integer literals to the declared numeric kind.
fn coerce(kind: &FieldKind, value: Value) -> Value {
    match (kind, value) {
        (FieldKind::Primitive(PrimitiveKind::Long), Value::Int(v)) => Value::Long(i64::from(v)),
        (FieldKind::Primitive(PrimitiveKind::Float), Value::Int(v)) => Value::Float(f64::from(v)),
        (FieldKind::Sequence(inner), Value::Sequence(items)) => {
            Value::Sequence(items.into_iter().map(|v| coerce(inner, v)).collect())
        }
        (FieldKind::Mapping(inner), Value::Mapping(entries)) => Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k, coerce(inner, v)))
                .collect(),
        ),
        (_, value) => value,
    }
}

// ----------------------------------------------------------------------------
// RecordBuilder
// ----------------------------------------------------------------------------

/// Unfrozen record: every public field can be set, replaced or cleared.
#[derive(Clone)]
pub struct RecordBuilder {
    info: Arc<TypeInfo>,
    /// One slot per declared field, in descriptor order.
    slots: Vec<Option<Value>>,
    internal: IndexMap<String, Value>,
}

impl RecordBuilder {
    /// Create an empty instance of `info`.
    pub fn new(info: &Arc<TypeInfo>) -> Self {
        Self {
            info: info.clone(),
            slots: vec![None; info.fields().len()],
            internal: IndexMap::new(),
        }
    }

    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    pub fn type_name(&self) -> &str {
        self.info.name()
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.info
            .field_index(name)
            .ok_or_else(|| no_such_field(self.info.name(), name))
    }

    /// Set a field. Names starting with `_` go to internal storage.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if is_internal(name) {
            self.internal.insert(name.to_string(), value.into());
            return Ok(());
        }
        let index = self.index_of(name)?;
        let kind = &self.info.fields()[index].kind;
        self.slots[index] = Some(coerce(kind, value.into()));
        Ok(())
    }

    /// Fluent variant of [`set`](Self::set).
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Clear a field, returning its previous value.
    pub fn unset(&mut self, name: &str) -> Result<Option<Value>> {
        if is_internal(name) {
            return Ok(self.internal.shift_remove(name));
        }
        let index = self.index_of(name)?;
        Ok(self.slots[index].take())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        if is_internal(name) {
            return self.internal.get(name);
        }
        self.info
            .field_index(name)
            .and_then(|index| self.slots[index].as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        if is_internal(name) {
            return self.internal.get_mut(name);
        }
        let index = self.info.field_index(name)?;
        self.slots[index].as_mut()
    }

    /// Typed read of a set field.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name).ok_or_else(|| Error::MissingField {
            type_name: self.type_name().to_string(),
            field: name.to_string(),
            path: name.to_string(),
        })?;
        T::from_value(value)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declared fields with their current values, in descriptor order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldSpec, Option<&Value>)> {
        self.info
            .fields()
            .iter()
            .zip(self.slots.iter().map(Option::as_ref))
    }

    /// Freeze this instance and everything it owns.
    pub fn build(self) -> Result<Record> {
        crate::build::build_record(self)
    }

    /// Copy the fields shared with `target` into a new instance of `target`.
    pub fn clone_as(&self, target: &Arc<TypeInfo>) -> RecordBuilder {
        crate::clone::copy_fields(&self.info, &self.slots, target)
    }

    pub(crate) fn slots(&self) -> &[Option<Value>] {
        &self.slots
    }

    /// Set a slot with a value already decoded to the declared kind.
    pub(crate) fn set_slot(&mut self, index: usize, value: Value) {
        self.slots[index] = Some(value);
    }

    pub(crate) fn fill_default(&mut self, index: usize, value: &Value) {
        if self.slots[index].is_none() {
            self.slots[index] = Some(value.clone());
        }
    }
}

impl PartialEq for RecordBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.info.name() == other.info.name() && self.slots == other.slots
    }
}

impl fmt::Debug for RecordBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordBuilder<{}> ", self.info.name())?;
        f.debug_map()
            .entries(self.fields().filter_map(|(spec, v)| v.map(|v| (&spec.name, v))))
            .finish()
    }
}

impl Freezable for RecordBuilder {
    fn is_frozen(&self) -> bool {
        false
    }
}

// ----------------------------------------------------------------------------
// Record
// ----------------------------------------------------------------------------

struct RecordInner {
    info: Arc<TypeInfo>,
    slots: Vec<Option<Value>>,
    /// Internal `_` fields, writable after freezing.
    internal: RwLock<IndexMap<String, Value>>,
}

/// Frozen record. Cloning the handle is cheap and shares the instance.
#[derive(Clone)]
pub struct Record {
    inner: Arc<RecordInner>,
}

impl Record {
    pub(crate) fn freeze(builder: RecordBuilder) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                info: builder.info,
                slots: builder.slots,
                internal: RwLock::new(builder.internal),
            }),
        }
    }

    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.inner.info
    }

    pub fn type_name(&self) -> &str {
        self.inner.info.name()
    }

    /// Value of a public field, `None` when unset or undeclared.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner
            .info
            .field_index(name)
            .and_then(|index| self.inner.slots[index].as_ref())
    }

    /// Typed read of a set public field.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name).ok_or_else(|| Error::MissingField {
            type_name: self.type_name().to_string(),
            field: name.to_string(),
            path: name.to_string(),
        })?;
        T::from_value(value)
    }

    /// Declared fields that are set, in descriptor order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldSpec, &Value)> {
        self.inner
            .info
            .fields()
            .iter()
            .zip(self.inner.slots.iter())
            .filter_map(|(spec, slot)| slot.as_ref().map(|v| (spec, v)))
    }

    pub(crate) fn slots(&self) -> &[Option<Value>] {
        &self.inner.slots
    }

    /// Set an internal `_` field. Public fields are immutable.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        if !is_internal(name) {
            return Err(Error::Immutable {
                type_name: self.type_name().to_string(),
                field: name.to_string(),
            });
        }
        self.inner
            .internal
            .write()
            .insert(name.to_string(), value.into());
        Ok(())
    }

    /// Internal field value.
    pub fn internal(&self, name: &str) -> Option<Value> {
        self.inner.internal.read().get(name).cloned()
    }

    /// Internal field value, computed by `init` on first access.
    pub fn cached<F>(&self, name: &str, init: F) -> Result<Value>
    where
        F: FnOnce(&Record) -> Value,
    {
        if !is_internal(name) {
            return Err(Error::Immutable {
                type_name: self.type_name().to_string(),
                field: name.to_string(),
            });
        }
        if let Some(value) = self.internal(name) {
            return Ok(value);
        }
        let value = init(self);
        let mut internal = self.inner.internal.write();
        Ok(internal
            .entry(name.to_string())
            .or_insert(value)
            .clone())
    }

    /// Key of this record, built from its key fields.
    pub fn key(&self) -> Result<Record> {
        match self.inner.info.category() {
            TypeCategory::Key => Ok(self.clone()),
            TypeCategory::Record { key } => {
                let mut builder = RecordBuilder::new(key);
                for spec in key.fields() {
                    if let Some(value) = self.get(&spec.name) {
                        builder.set(&spec.name, value.clone())?;
                    }
                }
                builder.build()
            }
            TypeCategory::Data => Err(Error::validation(
                self.type_name(),
                "type has no key",
            )),
        }
    }

    /// Hashable handle on the key of this record.
    pub fn hash_key(&self) -> Result<RecordKey> {
        RecordKey::new(self.key()?)
    }

    /// Building a frozen record is a no-op.
    pub fn build(self) -> Result<Record> {
        Ok(self)
    }

    /// Unfrozen copy of this record with the same type.
    pub fn clone_builder(&self) -> RecordBuilder {
        crate::clone::clone(self)
    }

    /// Unfrozen copy of the fields shared with `target`.
    pub fn clone_as(&self, target: &Arc<TypeInfo>) -> RecordBuilder {
        crate::clone::clone_as(self, target)
    }

    /// True if both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.type_name() == other.type_name() && self.inner.slots == other.inner.slots)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.type_name())?;
        f.debug_map()
            .entries(self.fields().map(|(spec, v)| (&spec.name, v)))
            .finish()
    }
}

impl Freezable for Record {
    fn is_frozen(&self) -> bool {
        true
    }
}

// ----------------------------------------------------------------------------
// DataRef
// ----------------------------------------------------------------------------

enum DataState {
    Open(RecordBuilder),
    Frozen(Record),
}

/// Shared cell holding a nested record.
///
/// Clones of a `DataRef` point to the same cell, which is what shallow
/// clones of the parent share. Once the cell is frozen every write through
/// any handle fails with [`Error::Immutable`].
#[derive(Clone)]
pub struct DataRef {
    cell: Arc<RwLock<DataState>>,
}

impl DataRef {
    pub fn new(builder: RecordBuilder) -> Self {
        Self {
            cell: Arc::new(RwLock::new(DataState::Open(builder))),
        }
    }

    pub fn type_info(&self) -> Arc<TypeInfo> {
        match &*self.cell.read() {
            DataState::Open(builder) => builder.type_info().clone(),
            DataState::Frozen(record) => record.type_info().clone(),
        }
    }

    pub fn type_name(&self) -> String {
        self.type_info().name().to_string()
    }

    /// Frozen record, once the enclosing graph has been built.
    pub fn record(&self) -> Option<Record> {
        match &*self.cell.read() {
            DataState::Open(_) => None,
            DataState::Frozen(record) => Some(record.clone()),
        }
    }

    /// Unfrozen copy of the current contents.
    pub fn snapshot(&self) -> RecordBuilder {
        match &*self.cell.read() {
            DataState::Open(builder) => builder.clone(),
            DataState::Frozen(record) => record.clone_builder(),
        }
    }

    /// Set a field of the nested record while it is still open.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        match &mut *self.cell.write() {
            DataState::Open(builder) => builder.set(name, value),
            DataState::Frozen(record) if is_internal(name) => record.set(name, value),
            DataState::Frozen(record) => Err(Error::Immutable {
                type_name: record.type_name().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Run `f` against the open builder.
    ///
    /// The cell stays locked while `f` runs; `f` must not touch this cell
    /// through another handle.
    pub fn update<R>(&self, f: impl FnOnce(&mut RecordBuilder) -> R) -> Result<R> {
        match &mut *self.cell.write() {
            DataState::Open(builder) => Ok(f(builder)),
            DataState::Frozen(record) => Err(Error::Immutable {
                type_name: record.type_name().to_string(),
                field: "*".to_string(),
            }),
        }
    }

    /// Identity of the cell, stable while any handle is alive.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.cell) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &DataRef) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// Builder to freeze, or `None` when the cell is already frozen.
    pub(crate) fn open_snapshot(&self) -> Option<RecordBuilder> {
        match &*self.cell.read() {
            DataState::Open(builder) => Some(builder.clone()),
            DataState::Frozen(_) => None,
        }
    }

    /// Transition the cell to frozen. The first record installed wins.
    pub(crate) fn install(&self, record: Record) -> Record {
        let mut state = self.cell.write();
        match &*state {
            DataState::Frozen(existing) => existing.clone(),
            DataState::Open(_) => {
                *state = DataState::Frozen(record.clone());
                record
            }
        }
    }

    /// Type name and slot values, read under a short-lived lock.
    fn contents(&self) -> (String, Vec<Option<Value>>) {
        match &*self.cell.read() {
            DataState::Open(builder) => {
                (builder.type_name().to_string(), builder.slots().to_vec())
            }
            DataState::Frozen(record) => {
                (record.type_name().to_string(), record.slots().to_vec())
            }
        }
    }
}

impl From<Record> for DataRef {
    fn from(record: Record) -> Self {
        Self {
            cell: Arc::new(RwLock::new(DataState::Frozen(record))),
        }
    }
}

impl PartialEq for DataRef {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        // Never hold both locks at once
        let left = self.contents();
        let right = other.contents();
        left == right
    }
}

impl fmt::Debug for DataRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.cell.read() {
            DataState::Open(builder) => write!(f, "DataRef(open {:?})", builder),
            DataState::Frozen(record) => write!(f, "DataRef({:?})", record),
        }
    }
}

impl Freezable for DataRef {
    fn is_frozen(&self) -> bool {
        matches!(&*self.cell.read(), DataState::Frozen(_))
    }
}

impl Freezable for Value {
    fn is_frozen(&self) -> bool {
        match self {
            Value::Data(data) => data.is_frozen(),
            Value::Sequence(items) => items.iter().all(Freezable::is_frozen),
            Value::Mapping(entries) => entries.values().all(Freezable::is_frozen),
            _ => true,
        }
    }
}
