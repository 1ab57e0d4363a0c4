// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shallow copies of records.
//!
//! Copies are always unfrozen. Field values are copied by handle, so a
//! nested record is shared between the source and the copy; replacing a
//! field of the copy never touches the source.

use crate::record::{Record, RecordBuilder};
use crate::schema::TypeInfo;
use crate::value::Value;
use std::sync::Arc;

/// Unfrozen copy of `record` with the same type.
pub fn clone(record: &Record) -> RecordBuilder {
    copy_fields(record.type_info(), record.slots(), record.type_info())
}

/// Unfrozen instance of `target` holding the fields it shares with `record`.
///
/// Fields are matched by declared name. Fields of the source that `target`
/// does not declare are dropped; fields only `target` declares stay unset.
pub fn clone_as(record: &Record, target: &Arc<TypeInfo>) -> RecordBuilder {
    copy_fields(record.type_info(), record.slots(), target)
}

pub(crate) fn copy_fields(
    source: &TypeInfo,
    slots: &[Option<Value>],
    target: &Arc<TypeInfo>,
) -> RecordBuilder {
    let mut copy = RecordBuilder::new(target);
    for (index, spec) in target.fields().iter().enumerate() {
        let value = source
            .field_index(&spec.name)
            .and_then(|i| slots.get(i))
            .and_then(Option::as_ref);
        if let Some(value) = value {
            copy.set_slot(index, value.clone());
        }
    }
    log::trace!("[clone] {} -> {}", source.name(), target.name());
    copy
}
