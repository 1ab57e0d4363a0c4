// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name to type descriptor resolution.
//!
//! The registry maps canonical type names and aliases to [`TypeInfo`] and
//! [`EnumInfo`] descriptors. It is safe to share between threads; lookups
//! never block registrations of unrelated names.

use crate::case::snake_to_pascal;
use crate::error::{Error, Result};
use crate::schema::{EnumInfo, TypeInfo};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;

/// Concurrent registry of record and enum types.
#[derive(Default)]
pub struct TypeRegistry {
    types: DashMap<String, Arc<TypeInfo>>,
    enums: DashMap<String, Arc<EnumInfo>>,
    /// Alias -> canonical name.
    aliases: DashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_taken(&self, name: &str) -> bool {
        self.types.contains_key(name)
            || self.enums.contains_key(name)
            || self.aliases.contains_key(name)
    }

    /// Register a record type under its canonical name.
    ///
    /// The parent chain of the type must already be registered.
    pub fn register(&self, info: impl Into<Arc<TypeInfo>>) -> Result<Arc<TypeInfo>> {
        let info = info.into();
        let name = info.name().to_string();

        if let Some(parent) = info.parent() {
            if !self.types.contains_key(parent.name()) {
                return Err(Error::schema(
                    &name,
                    format!("parent type '{}' is not registered", parent.name()),
                ));
            }
        }
        if self.enums.contains_key(&name) || self.aliases.contains_key(&name) {
            return Err(Error::schema(&name, "name already in use"));
        }

        match self.types.entry(name.clone()) {
            Entry::Occupied(_) => Err(Error::schema(&name, "type already registered")),
            Entry::Vacant(slot) => {
                slot.insert(info.clone());
                log::debug!("[registry] registered type {}", name);
                Ok(info)
            }
        }
    }

    /// Register an enum type under its canonical name.
    pub fn register_enum(&self, info: EnumInfo) -> Result<Arc<EnumInfo>> {
        let name = info.name().to_string();
        if info.items().is_empty() {
            return Err(Error::schema(&name, "enum has no items"));
        }
        if self.types.contains_key(&name) || self.aliases.contains_key(&name) {
            return Err(Error::schema(&name, "name already in use"));
        }

        let info = Arc::new(info);
        match self.enums.entry(name.clone()) {
            Entry::Occupied(_) => Err(Error::schema(&name, "enum already registered")),
            Entry::Vacant(slot) => {
                slot.insert(info.clone());
                log::debug!("[registry] registered enum {}", name);
                Ok(info)
            }
        }
    }

    /// Make `alias` resolve to the same type as `target`.
    pub fn register_alias(&self, alias: &str, target: &str) -> Result<()> {
        let canonical = self.canonical_name(target)?;
        if self.name_taken(alias) {
            return Err(Error::schema(alias, "name already in use"));
        }
        self.aliases.insert(alias.to_string(), canonical.clone());
        log::debug!("[registry] alias {} -> {}", alias, canonical);
        Ok(())
    }

    /// Canonical name of a type or enum given its name or an alias.
    pub fn canonical_name(&self, name: &str) -> Result<String> {
        if self.types.contains_key(name) || self.enums.contains_key(name) {
            return Ok(name.to_string());
        }
        self.aliases
            .get(name)
            .map(|target| target.value().clone())
            .ok_or_else(|| Error::TypeNotFound(name.to_string()))
    }

    /// Record type by canonical name or alias.
    pub fn resolve(&self, name: &str) -> Result<Arc<TypeInfo>> {
        if let Some(info) = self.types.get(name) {
            return Ok(info.value().clone());
        }
        let canonical = self.aliases.get(name).map(|t| t.value().clone());
        canonical
            .and_then(|c| self.types.get(&c).map(|info| info.value().clone()))
            .ok_or_else(|| Error::TypeNotFound(name.to_string()))
    }

    /// Enum type by canonical name or alias.
    pub fn resolve_enum(&self, name: &str) -> Result<Arc<EnumInfo>> {
        if let Some(info) = self.enums.get(name) {
            return Ok(info.value().clone());
        }
        let canonical = self.aliases.get(name).map(|t| t.value().clone());
        canonical
            .and_then(|c| self.enums.get(&c).map(|info| info.value().clone()))
            .ok_or_else(|| Error::TypeNotFound(name.to_string()))
    }

    /// Record type named by a file stem, e.g. `trade_order.json` -> `TradeOrder`.
    pub fn resolve_file_hint(&self, path: impl AsRef<Path>) -> Result<Arc<TypeInfo>> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::TypeNotFound(path.display().to_string()))?;
        self.resolve(&snake_to_pascal(stem))
    }

    /// True if a value of `sub` may be stored where `sup` is declared.
    pub fn is_assignable(&self, sub: &str, sup: &str) -> Result<bool> {
        let sub = self.resolve(sub)?;
        let sup = self.canonical_name(sup)?;
        Ok(sub.is_subtype_of(&sup))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_taken(name)
    }

    /// Canonical record type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// All registered record types.
    pub fn types(&self) -> Vec<Arc<TypeInfo>> {
        self.types.iter().map(|e| e.value().clone()).collect()
    }

    /// Number of registered record and enum types.
    pub fn len(&self) -> usize {
        self.types.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
