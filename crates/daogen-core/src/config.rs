// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Run-level generator configuration.
//!
//! Parsed with darling from an inner `#![daogen(...)]` attribute of the macro
//! input, or built directly by a build script.
//!
//! # Supported Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `dialect` | `"postgres"` | Target database dialect |
//! | `id_write_back` | `true` | Write generated identities back onto inserted entities |

use darling::FromMeta;
use syn::Attribute;

use crate::dialect::Dialect;

/// Name of the inner attribute carrying [`GeneratorConfig`].
pub const CONFIG_ATTRIBUTE: &str = "daogen";

/// Configuration shared by every repository of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, FromMeta)]
#[darling(default)]
pub struct GeneratorConfig {
    /// Target database dialect.
    pub dialect: Dialect,

    /// Identity write-back policy.
    ///
    /// When `true`, inserts taking `&mut Entity` whose identity is marked
    /// `#[id(generated)]` store the database-assigned identity on the entity.
    pub id_write_back: bool
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            dialect:       Dialect::default(),
            id_write_back: true
        }
    }
}

impl GeneratorConfig {
    /// Set the target dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the identity write-back policy.
    #[must_use]
    pub fn with_id_write_back(mut self, enabled: bool) -> Self {
        self.id_write_back = enabled;
        self
    }

    /// Read configuration from `#![daogen(...)]` among the given attributes.
    ///
    /// Returns the default configuration when the attribute is absent.
    ///
    /// # Errors
    ///
    /// Unknown options or malformed values.
    pub fn from_attributes(attrs: &[Attribute]) -> darling::Result<Self> {
        match attrs
            .iter()
            .find(|attr| attr.path().is_ident(CONFIG_ATTRIBUTE))
        {
            Some(attr) => Self::from_meta(&attr.meta),
            None => Ok(Self::default())
        }
    }
}
