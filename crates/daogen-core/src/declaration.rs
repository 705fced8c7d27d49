// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Front-end neutral declarations consumed by the generator.
//!
//! A front end (source parsing, the `daogen!` macro, a configuration file)
//! describes entities and repositories with these types and exposes them
//! through [`DeclarationSource`]. The engine never looks at attributes
//! directly.
//!
//! # Data Structures
//!
//! ```text
//! EntityDecl
//! ├── qualified_name: String      (e.g. "model::User")
//! ├── table_name: Option<String>  (from #[table(name = ...)])
//! └── fields: Vec<FieldDecl>
//!     └── FieldDecl
//!         ├── name: String           (Rust field name)
//!         ├── column: Option<String> (#[column("...")])
//!         ├── id: Option<IdDecl>     (#[id], #[id("col", generated)])
//!         └── ignored: bool          (#[ignored])
//!
//! RepositoryDecl
//! ├── qualified_name: String      (e.g. "dao::UserDao")
//! ├── model: String               (entity reference as written)
//! ├── file_name: Option<String>
//! └── methods: Vec<MethodDecl>
//!     └── MethodDecl
//!         ├── name: Ident
//!         ├── params: Vec<ParamDecl>
//!         ├── output: Type           (declared return type)
//!         └── annotations: Vec<StatementAnnotation>
//! ```

use syn::{Ident, Type};

use crate::{descriptor::StatementKind, mapping::unraw};

/// One entity declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDecl {
    /// Fully-qualified entity name, used as the registry key and as the Rust
    /// path of the entity in generated code.
    pub qualified_name: String,

    /// Table name from `#[table(name = "...")]`.
    pub table_name: Option<String>,

    /// Fields in declaration order.
    pub fields: Vec<FieldDecl>
}

/// One entity field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDecl {
    /// Field name as written in the struct (raw identifiers keep `r#`).
    pub name: String,

    /// Column override from `#[column("...")]`.
    pub column: Option<String>,

    /// Identity marker from `#[id]`.
    pub id: Option<IdDecl>,

    /// Excluded from persistence via `#[ignored]`.
    pub ignored: bool
}

/// Identity configuration of a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdDecl {
    /// Column override; defaults to the field name.
    pub column: Option<String>,

    /// Value is assigned by the database on insert.
    pub generated: bool,

    /// Field type is `Option<_>`.
    pub optional: bool
}

/// One repository declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDecl {
    /// Fully-qualified trait name.
    pub qualified_name: String,

    /// Entity reference as written in `#[dao_gen(model = ...)]`.
    pub model: String,

    /// Output name from `#[dao_gen(file_name = "...")]`.
    pub file_name: Option<String>,

    /// Trait methods in declaration order.
    pub methods: Vec<MethodDecl>
}

impl RepositoryDecl {
    /// Module part of the qualified name (empty at the root).
    #[must_use]
    pub fn module_path(&self) -> &str {
        self.qualified_name
            .rsplit_once("::")
            .map_or("", |(module, _)| module)
    }

    /// Trait name without its module.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit_once("::")
            .map_or(self.qualified_name.as_str(), |(_, name)| name)
    }
}

/// One repository method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name.
    pub name: Ident,

    /// Parameters after the receiver.
    pub params: Vec<ParamDecl>,

    /// Declared return type; `()` when omitted.
    pub output: Type,

    /// Statement annotations in the order they were written.
    pub annotations: Vec<StatementAnnotation>
}

impl MethodDecl {
    /// Position of the parameter with the given name (`r#` ignored).
    #[must_use]
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|p| unraw(&p.name.to_string()) == name)
    }
}

/// One method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    /// Parameter binding name.
    pub name: Ident,

    /// Parameter type.
    pub ty: Type
}

/// A statement-kind annotation and its SQL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementAnnotation {
    /// Statement kind.
    pub kind: StatementKind,

    /// Template text; empty when the annotation carries no value.
    pub template: String
}

/// Anything able to enumerate entity and repository declarations.
pub trait DeclarationSource {
    /// Entity declarations of the run.
    fn entities(&self) -> &[EntityDecl];

    /// Repository declarations of the run.
    fn repositories(&self) -> &[RepositoryDecl];
}

/// Declarations assembled by hand.
///
/// Useful for front ends that build declarations from something other than
/// Rust source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    /// Entity declarations.
    pub entities: Vec<EntityDecl>,

    /// Repository declarations.
    pub repositories: Vec<RepositoryDecl>
}

impl DeclarationSource for Declarations {
    fn entities(&self) -> &[EntityDecl] {
        &self.entities
    }

    fn repositories(&self) -> &[RepositoryDecl] {
        &self.repositories
    }
}
