// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity mapper.
//!
//! Turns one [`EntityDecl`] into a [`TableMapping`]: the table name, the
//! identity field and column, and the field/column correspondence of every
//! other persisted field.
//!
//! # Column Resolution
//!
//! | Declaration | Column |
//! |-------------|--------|
//! | `name: String` | `name` |
//! | `#[column("email_addr")] email: String` | `email_addr` |
//! | `#[id] id: i64` | `id` |
//! | `#[id("user_id")] id: i64` | `user_id` |
//! | `#[ignored] cache: String` | none, field is not persisted |
//!
//! Raw identifiers are stored without their `r#` prefix, so `r#type` maps to
//! the column `type`.

use indexmap::IndexMap;
use proc_macro2::Span;
use syn::Ident;

use crate::{
    declaration::EntityDecl,
    error::{Error, Result}
};

/// Persistence shape of one entity.
///
/// `field_to_column` and `column_to_field` cover every persisted field
/// except the identity and are exact inverses of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    /// Fully-qualified entity name.
    pub entity_name: String,

    /// Target table.
    pub table_name: String,

    /// Identity field, if the entity declares one.
    pub id_field: Option<String>,

    /// Identity column, present exactly when `id_field` is.
    pub id_column: Option<String>,

    /// Identity value is assigned by the database.
    pub id_generated: bool,

    /// Identity field is an `Option<_>`.
    pub id_optional: bool,

    /// Non-identity field to column, in declaration order.
    pub field_to_column: IndexMap<String, String>,

    /// Column to non-identity field, in declaration order.
    pub column_to_field: IndexMap<String, String>,

    /// Fields excluded from persistence, in declaration order.
    pub ignored_fields: Vec<String>
}

impl TableMapping {
    /// Entity name without its module path.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.entity_name
            .rsplit_once("::")
            .map_or(self.entity_name.as_str(), |(_, name)| name)
    }

    /// Column of a persisted field, identity included.
    #[must_use]
    pub fn column_of(&self, field: &str) -> Option<&str> {
        if self.id_field.as_deref() == Some(field) {
            return self.id_column.as_deref();
        }
        self.field_to_column.get(field).map(String::as_str)
    }

    /// Field stored in a column, identity included.
    #[must_use]
    pub fn field_of(&self, column: &str) -> Option<&str> {
        if self.id_column.as_deref() == Some(column) {
            return self.id_field.as_deref();
        }
        self.column_to_field.get(column).map(String::as_str)
    }

    /// Check if `name` is a persisted field, identity included.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.column_of(name).is_some()
    }

    /// Every persisted `(field, column)` pair, identity first.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.id_pair().into_iter().chain(self.non_id_columns())
    }

    /// Pairs written by a plain insert.
    ///
    /// A database-generated identity is left to the database.
    pub fn insertable_columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.id_pair()
            .filter(|_| !self.id_generated)
            .into_iter()
            .chain(self.non_id_columns())
    }

    /// Pairs of every persisted field except the identity.
    pub fn non_id_columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.field_to_column
            .iter()
            .map(|(field, column)| (field.as_str(), column.as_str()))
    }

    /// Comma-separated list of all persisted columns.
    #[must_use]
    pub fn column_list(&self) -> String {
        self.columns()
            .map(|(_, column)| column)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Rust path of the entity as seen from `module`.
    ///
    /// Names rooted at `crate` are absolute. Other names are relative to the
    /// root of the run, so one `super` is prepended per module segment.
    ///
    /// # Errors
    ///
    /// The resulting name is not a valid Rust path.
    pub fn entity_path_from(&self, module: &str) -> syn::Result<syn::Path> {
        if self.entity_name.starts_with("crate::") {
            return syn::parse_str(&self.entity_name);
        }
        let depth = module
            .split("::")
            .filter(|segment| !segment.is_empty())
            .count();
        let path = std::iter::repeat_n("super", depth)
            .chain(std::iter::once(self.entity_name.as_str()))
            .collect::<Vec<_>>()
            .join("::");
        syn::parse_str(&path)
    }

    fn id_pair(&self) -> Option<(&str, &str)> {
        self.id_field.as_deref().zip(self.id_column.as_deref())
    }
}

/// Build the table mapping of one entity declaration.
///
/// # Errors
///
/// [`Error::Configuration`] when the table name is missing or empty, more
/// than one field is marked `#[id]`, a column override is empty, or two
/// fields resolve to the same column.
pub fn map_entity(decl: &EntityDecl) -> Result<TableMapping> {
    let entity = decl.qualified_name.as_str();
    let table_name = decl
        .table_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::configuration(entity, "missing table name in #[table(name = ...)]"))?;

    let mut mapping = TableMapping {
        entity_name:     entity.to_owned(),
        table_name:      table_name.to_owned(),
        id_field:        None,
        id_column:       None,
        id_generated:    false,
        id_optional:     false,
        field_to_column: IndexMap::new(),
        column_to_field: IndexMap::new(),
        ignored_fields:  Vec::new()
    };

    for field in &decl.fields {
        let name = unraw(&field.name).to_owned();
        if field.ignored {
            mapping.ignored_fields.push(name);
            continue;
        }

        let column_override = match &field.id {
            Some(id) => id.column.as_deref(),
            None => field.column.as_deref()
        };
        let column = resolve_column(entity, &name, column_override)?;
        if mapping.field_of(&column).is_some() {
            return Err(Error::configuration(
                entity,
                format!("column `{column}` of field `{name}` is already mapped")
            ));
        }

        match &field.id {
            Some(_) if mapping.id_field.is_some() => {
                return Err(Error::configuration(
                    entity,
                    format!(
                        "fields `{}` and `{name}` are both marked #[id]",
                        mapping.id_field.as_deref().unwrap_or_default()
                    )
                ));
            }
            Some(id) => {
                mapping.id_field = Some(name);
                mapping.id_column = Some(column);
                mapping.id_generated = id.generated;
                mapping.id_optional = id.optional;
            }
            None => {
                mapping.column_to_field.insert(column.clone(), name.clone());
                mapping.field_to_column.insert(name, column);
            }
        }
    }

    tracing::debug!(
        entity = %mapping.entity_name,
        table = %mapping.table_name,
        columns = mapping.field_to_column.len() + usize::from(mapping.id_field.is_some()),
        "mapped entity"
    );
    Ok(mapping)
}

fn resolve_column(entity: &str, field: &str, column_override: Option<&str>) -> Result<String> {
    let column = column_override.map(str::trim).unwrap_or(field);
    if column.is_empty() {
        return Err(Error::configuration(
            entity,
            format!("field `{field}` has an empty column name")
        ));
    }
    Ok(column.to_owned())
}

/// Strip the `r#` prefix of a raw identifier.
#[must_use]
pub fn unraw(name: &str) -> &str {
    name.strip_prefix("r#").unwrap_or(name)
}

/// Identifier for a field name, raw when the name is a keyword.
#[must_use]
pub fn field_ident(name: &str) -> Ident {
    let name = unraw(name);
    syn::parse_str::<Ident>(name).unwrap_or_else(|_| Ident::new_raw(name, Span::call_site()))
}
