// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Code emission.
//!
//! [`emit`] assembles the descriptors of one repository into a
//! [`GeneratedUnit`]; an [`Emitter`] persists it.
//!
//! # Generated Unit
//!
//! ```rust,ignore
//! const _: () = {
//!     fn from_row(row: &sqlx::postgres::PgRow) -> Result<super::model::User, sqlx::Error> { ... }
//!     fn narrow<S, T>(value: S) -> Result<T, sqlx::Error> where T: TryFrom<S>, ... { ... }
//!
//!     #[async_trait::async_trait]
//!     impl UserDao for sqlx::PgPool {
//!         async fn find_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error> { ... }
//!     }
//! };
//! ```
//!
//! A unit belongs in the module declaring the repository trait, `dao` above:
//! the trait is named by its simple name, the entity by a path relative to
//! that module, and method signatures are copied as written.
//!
//! The row mapper and `narrow` are only present when a method uses them.
//! Output is a pure function of the inputs: emitting the same descriptors
//! twice yields byte-identical text.

use std::{
    fs,
    path::{Path, PathBuf}
};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

use crate::{
    descriptor::{BindTarget, StatementDescriptor},
    dialect::Dialect,
    error::{Error, Result},
    mapping::{TableMapping, field_ident},
    strategy
};

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// @generated by daogen. Do not edit by hand.";

/// Generated implementation of one repository.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Qualified repository name.
    pub repository: String,

    /// Output file name, e.g. `user_dao.rs`.
    pub file_name: String,

    /// Number of generated methods.
    pub methods: usize,

    /// Generated items.
    pub tokens: TokenStream
}

impl GeneratedUnit {
    /// Source text with the generated-code header.
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "{GENERATED_HEADER}\n// repository: {}\n{}\n",
            self.repository, self.tokens
        )
    }
}

/// Receives generated units.
pub trait Emitter {
    /// Persist one unit.
    ///
    /// # Errors
    ///
    /// Implementation-defined; [`Error::Io`] for filesystem emitters.
    fn emit(&mut self, unit: &GeneratedUnit) -> Result<()>;
}

/// Writes each unit to `<dir>/<file_name>`.
#[derive(Debug, Clone)]
pub struct FsEmitter {
    dir: PathBuf
}

impl FsEmitter {
    /// Emit into `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into()
        }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Emitter for FsEmitter {
    fn emit(&mut self, unit: &GeneratedUnit) -> Result<()> {
        let path = self.dir.join(&unit.file_name);
        let io = |source| Error::Io {
            path: path.clone(),
            source
        };
        fs::create_dir_all(&self.dir).map_err(io)?;
        fs::write(&path, unit.text()).map_err(io)?;
        tracing::debug!(path = %path.display(), "wrote generated unit");
        Ok(())
    }
}

/// Keeps units in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct MemoryEmitter {
    units: Vec<GeneratedUnit>
}

impl MemoryEmitter {
    /// Create an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Units received so far.
    #[must_use]
    pub fn units(&self) -> &[GeneratedUnit] {
        &self.units
    }

    /// Take the collected units.
    #[must_use]
    pub fn into_units(self) -> Vec<GeneratedUnit> {
        self.units
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, unit: &GeneratedUnit) -> Result<()> {
        self.units.push(unit.clone());
        Ok(())
    }
}

/// Names and types shared by every method of one unit.
pub(crate) struct UnitContext {
    pub dialect:    Dialect,
    pub database:   TokenStream,
    pub row_mapper: Ident
}

impl UnitContext {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            database: dialect.database_type(),
            row_mapper: format_ident!("from_row")
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(dialect: Dialect) -> Self {
        Self::new(dialect)
    }
}

/// Assemble the descriptors of one repository into a generated unit.
///
/// # Errors
///
/// [`Error::Emission`] when a name is not a valid Rust path, or a descriptor
/// belongs to another entity or refers to a parameter its method lacks.
pub fn emit(
    repository: &str,
    file_name: &str,
    descriptors: &[StatementDescriptor<'_>],
    owner: &TableMapping,
    dialect: Dialect
) -> Result<GeneratedUnit> {
    let emission = |reason: String| Error::Emission {
        repository: repository.to_owned(),
        reason
    };
    let trait_path: syn::Path = syn::parse_str(repository)
        .map_err(|err| emission(format!("`{repository}` is not a valid trait path: {err}")))?;
    let trait_name = trait_path
        .segments
        .last()
        .map(|segment| &segment.ident)
        .ok_or_else(|| emission(format!("`{repository}` is an empty trait path")))?;
    let module = repository.rsplit_once("::").map_or("", |(module, _)| module);
    let entity_path = owner.entity_path_from(module).map_err(|err| {
        emission(format!(
            "`{}` is not a valid entity path: {err}",
            owner.entity_name
        ))
    })?;
    for descriptor in descriptors {
        check(descriptor, owner).map_err(&emission)?;
    }

    let unit = UnitContext::new(dialect);
    let pool = dialect.pool_type();
    let row_mapper = descriptors
        .iter()
        .any(strategy::needs_row_mapper)
        .then(|| row_mapper(owner, &entity_path, &unit));
    let narrow = descriptors
        .iter()
        .any(|descriptor| strategy::needs_narrow(descriptor, dialect))
        .then(narrow_helper);
    let methods = descriptors
        .iter()
        .map(|descriptor| strategy::render(descriptor, &unit));

    let tokens = quote! {
        const _: () = {
            #row_mapper
            #narrow

            #[async_trait::async_trait]
            impl #trait_name for #pool {
                #(#methods)*
            }
        };
    };

    tracing::debug!(
        repository,
        file_name,
        methods = descriptors.len(),
        "emitted repository"
    );
    Ok(GeneratedUnit {
        repository: repository.to_owned(),
        file_name: file_name.to_owned(),
        methods: descriptors.len(),
        tokens
    })
}

/// Internal consistency of one descriptor.
fn check(descriptor: &StatementDescriptor<'_>, owner: &TableMapping) -> Result<(), String> {
    let method = &descriptor.method.name;
    if descriptor.owner.entity_name != owner.entity_name {
        return Err(format!(
            "`{method}` was built for `{}`, not `{}`",
            descriptor.owner.entity_name, owner.entity_name
        ));
    }
    let params = descriptor.method.params.len();
    let in_range = |index: usize| {
        if index < params {
            Ok(())
        } else {
            Err(format!("`{method}` binds parameter #{index} of {params}"))
        }
    };
    for binding in &descriptor.parameter_bindings {
        match &binding.target {
            BindTarget::Param {
                index
            } => in_range(*index)?,
            BindTarget::Field {
                param,
                field
            } => {
                in_range(*param)?;
                if !owner.has_field(field) {
                    return Err(format!("`{method}` binds unknown field `{field}`"));
                }
            }
        }
    }
    if let Some(write_back) = &descriptor.write_back {
        in_range(write_back.param)?;
    }
    if let Some(batch) = &descriptor.batch {
        in_range(batch.param)?;
    }
    Ok(())
}

/// `fn from_row(row) -> Result<Entity, sqlx::Error>` reading every persisted
/// column by name.
fn row_mapper(owner: &TableMapping, entity: &syn::Path, unit: &UnitContext) -> TokenStream {
    let name = &unit.row_mapper;
    let row = unit.dialect.row_type();
    let persisted = owner.columns().map(|(field, column)| {
        let field = field_ident(field);
        quote! { #field: row.try_get(#column)? }
    });
    let ignored = owner.ignored_fields.iter().map(|field| {
        let field = field_ident(field);
        quote! { #field: ::core::default::Default::default() }
    });

    quote! {
        fn #name(row: &#row) -> ::core::result::Result<#entity, sqlx::Error> {
            use sqlx::Row as _;
            Ok(#entity {
                #(#persisted,)*
                #(#ignored,)*
            })
        }
    }
}

/// Integer conversion reporting overflow as a decode error.
fn narrow_helper() -> TokenStream {
    quote! {
        fn narrow<S, T>(value: S) -> ::core::result::Result<T, sqlx::Error>
        where
            T: ::core::convert::TryFrom<S>,
            <T as ::core::convert::TryFrom<S>>::Error: ::std::error::Error + Send + Sync + 'static
        {
            T::try_from(value).map_err(|err| sqlx::Error::Decode(::std::boxed::Box::new(err)))
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;
    use crate::{
        config::GeneratorConfig,
        descriptor::{DescriptorBuilder, StatementKind},
        strategy::fixtures::{method, param, user}
    };

    #[test]
    fn unit_text_is_deterministic() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let methods = vec![
            method(
                StatementKind::Select,
                "where name = ?name",
                vec![param("name", parse_quote!(&str))],
                parse_quote!(Result<Vec<User>, sqlx::Error>)
            ),
            method(
                StatementKind::Count,
                "",
                Vec::new(),
                parse_quote!(Result<i64, sqlx::Error>)
            ),
        ];
        let builder = DescriptorBuilder::new(&mapping, "dao::UserDao", &config);
        let first = builder.build_all(&methods).unwrap();
        let second = builder.build_all(&methods).unwrap();

        let a = emit("dao::UserDao", "user_dao.rs", &first, &mapping, config.dialect).unwrap();
        let b = emit("dao::UserDao", "user_dao.rs", &second, &mapping, config.dialect).unwrap();
        assert_eq!(a.text(), b.text());
        assert!(a.text().starts_with(GENERATED_HEADER));
        assert_eq!(a.methods, 2);
    }

    #[test]
    fn empty_repository_has_no_methods_or_helpers() {
        let mapping = user(false);
        let unit = emit("dao::UserDao", "user_dao.rs", &[], &mapping, Dialect::Postgres).unwrap();
        let text = unit.tokens.to_string();
        assert_eq!(unit.methods, 0);
        assert!(text.contains("impl UserDao for sqlx :: PgPool { }"));
        assert!(!text.contains("from_row"));
        assert!(!text.contains("narrow"));
    }

    #[test]
    fn row_mapper_fills_ignored_fields() {
        let mapping = user(false);
        let config = GeneratorConfig::default().with_dialect(Dialect::Sqlite);
        let methods = vec![method(
            StatementKind::Select,
            "",
            Vec::new(),
            parse_quote!(Result<Vec<User>, sqlx::Error>)
        )];
        let descriptors = DescriptorBuilder::new(&mapping, "dao::UserDao", &config)
            .build_all(&methods)
            .unwrap();
        let text = emit("dao::UserDao", "user_dao.rs", &descriptors, &mapping, Dialect::Sqlite)
            .unwrap()
            .tokens
            .to_string();
        assert!(text.contains("sqlx :: sqlite :: SqliteRow"));
        assert!(text.contains("email_address : row . try_get (\"email_addr\") ?"));
        assert!(text.contains("cache : :: core :: default :: Default :: default ()"));
        assert!(text.contains("impl UserDao for sqlx :: SqlitePool"));
        assert!(text.contains("Result < super :: model :: User , sqlx :: Error >"));
    }

    #[test]
    fn foreign_descriptor_is_an_emission_error() {
        let mapping = user(false);
        let mut other = user(false);
        other.entity_name = "model::Account".to_owned();
        let config = GeneratorConfig::default();
        let methods = vec![method(
            StatementKind::Count,
            "",
            Vec::new(),
            parse_quote!(Result<i64, sqlx::Error>)
        )];
        let descriptors = DescriptorBuilder::new(&mapping, "dao::UserDao", &config)
            .build_all(&methods)
            .unwrap();
        let err = emit("dao::UserDao", "user_dao.rs", &descriptors, &other, config.dialect)
            .unwrap_err();
        assert!(matches!(err, Error::Emission { .. }));
    }

    #[test]
    fn invalid_trait_path_is_an_emission_error() {
        let mapping = user(false);
        let err = emit("not a path", "x.rs", &[], &mapping, Dialect::Postgres).unwrap_err();
        assert!(matches!(err, Error::Emission { ref repository, .. } if repository == "not a path"));
    }

    #[test]
    fn memory_emitter_collects_units() {
        let mapping = user(false);
        let unit = emit("dao::UserDao", "user_dao.rs", &[], &mapping, Dialect::Postgres).unwrap();
        let mut emitter = MemoryEmitter::new();
        emitter.emit(&unit).unwrap();
        emitter.emit(&unit).unwrap();
        assert_eq!(emitter.units().len(), 2);
        assert_eq!(emitter.into_units()[0].file_name, "user_dao.rs");
    }

    #[test]
    fn fs_emitter_writes_file() {
        let mapping = user(false);
        let unit = emit("dao::UserDao", "user_dao.rs", &[], &mapping, Dialect::Postgres).unwrap();
        let dir = std::env::temp_dir().join(format!("daogen-emit-{}", std::process::id()));
        let mut emitter = FsEmitter::new(&dir);
        emitter.emit(&unit).unwrap();
        let written = fs::read_to_string(dir.join("user_dao.rs")).unwrap();
        assert_eq!(written, unit.text());
        fs::remove_dir_all(&dir).unwrap();
    }
}
