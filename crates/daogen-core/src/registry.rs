// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Mapping registry scoped to one generation run.
//!
//! Registration needs `&mut MappingRegistry`, lookups only `&MappingRegistry`:
//! once statement building borrows the registry it is frozen for the rest of
//! the run.

use indexmap::IndexMap;

use crate::{
    error::{Error, Result},
    mapping::TableMapping
};

/// Table mappings keyed by qualified entity name.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    mappings: IndexMap<String, TableMapping>
}

impl MappingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateEntity`] when the entity is already registered; the
    /// registry is left untouched.
    pub fn register(&mut self, mapping: TableMapping) -> Result<()> {
        if self.mappings.contains_key(&mapping.entity_name) {
            return Err(Error::DuplicateEntity {
                entity: mapping.entity_name
            });
        }
        tracing::debug!(entity = %mapping.entity_name, "registered table mapping");
        self.mappings.insert(mapping.entity_name.clone(), mapping);
        Ok(())
    }

    /// Find the mapping of an entity.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEntity`] naming `repository` as the referrer.
    pub fn lookup(&self, entity: &str, repository: &str) -> Result<&TableMapping> {
        self.mappings.get(entity).ok_or_else(|| Error::UnknownEntity {
            repository: repository.to_owned(),
            entity:     entity.to_owned()
        })
    }

    /// Find the mapping of an entity without error context.
    #[must_use]
    pub fn get(&self, entity: &str) -> Option<&TableMapping> {
        self.mappings.get(entity)
    }

    /// Check if no entity was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Registered mappings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TableMapping> {
        self.mappings.values()
    }
}
