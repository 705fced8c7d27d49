// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

//! # daogen-core
//!
//! Engine behind `daogen`: maps `#[table]` structs to tables, turns
//! annotated repository traits into SQL statement descriptors and emits
//! `sqlx` implementations of those traits.
//!
//! Used by the `daogen` proc-macros and directly from build scripts.
//!
//! # Pipeline
//!
//! ```text
//! SourceFile / Declarations
//!   │
//!   ├─► map_entity ──► MappingRegistry      (phase 1, fatal errors)
//!   │
//!   └─► per repository                      (phase 2, scoped errors)
//!         resolve_model
//!         DescriptorBuilder ──► StatementDescriptor*
//!         emit ──► GeneratedUnit ──► Emitter
//! ```
//!
//! # Build Script
//!
//! ```rust,ignore
//! fn main() {
//!     let source = daogen_core::SourceFile::from_path("src/db.rs", "crate::db").unwrap();
//!     let out = std::env::var("OUT_DIR").unwrap();
//!     let report = daogen_core::Generator::new(source.config().clone())
//!         .run(&source, &mut daogen_core::FsEmitter::new(out))
//!         .unwrap();
//!     for failure in &report.failures {
//!         println!("cargo::warning={failure}");
//!     }
//! }
//! ```
//!
//! # Statement Kinds
//!
//! | Attribute | Template | Result |
//! |-----------|----------|--------|
//! | `#[select]` | `SELECT` statement or fragment after `SELECT cols FROM table` | `Vec<E>`, `Option<E>`, `E` |
//! | `#[count]` | fragment after `SELECT count(*) FROM table` | integer |
//! | `#[insert]` | optional, defaults to every insertable column | integer or `()` |
//! | `#[batch_insert]` | optional column list | integer |
//! | `#[update]` | `SET ...` fragment or full statement | integer |
//! | `#[delete]` | fragment after `DELETE FROM table` | integer |

mod config;
mod declaration;
mod descriptor;
mod dialect;
mod emit;
mod error;
mod generator;
mod mapping;
mod registry;
mod source;
mod strategy;
mod template;
mod types;

pub use config::{CONFIG_ATTRIBUTE, GeneratorConfig};
pub use declaration::{
    DeclarationSource, Declarations, EntityDecl, FieldDecl, IdDecl, MethodDecl, ParamDecl,
    RepositoryDecl, StatementAnnotation
};
pub use descriptor::{
    BatchRows, BindTarget, DescriptorBuilder, ParameterBinding, ResultShape, StatementDescriptor,
    StatementKind, WriteBack
};
pub use dialect::Dialect;
pub use emit::{Emitter, FsEmitter, GENERATED_HEADER, GeneratedUnit, MemoryEmitter, emit};
pub use error::{Error, Result};
pub use generator::{Generator, RunReport, output_file_name, resolve_model};
pub use mapping::{TableMapping, map_entity};
pub use registry::MappingRegistry;
pub use source::{
    FIELD_ATTRIBUTES, REPOSITORY_ATTRIBUTE, SourceFile, TABLE_ATTRIBUTE, entity_from_struct,
    repository_from_trait, strip_generator_attributes, strip_trait
};
pub use template::{Marker, Template};
