// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Statement descriptors and the builder producing them.
//!
//! [`DescriptorBuilder::build`] turns one repository method into a
//! [`StatementDescriptor`]: the final SQL text, the ordered parameter
//! bindings behind its placeholders, and the shape of the result.
//!
//! # Build Steps
//!
//! ```text
//! MethodDecl
//!   │
//!   ├─► pick annotation      (fixed priority, none → skipped)
//!   ├─► unwrap Result<T, E>  (SignatureError otherwise)
//!   ├─► scan template        (field names → columns)
//!   ├─► resolve markers      (names first, then positions)
//!   └─► kind strategy        (signature check, result shape, SQL assembly)
//!         │
//!         ▼
//!   StatementDescriptor
//! ```

use std::fmt;

use syn::Type;

use crate::{
    config::GeneratorConfig,
    declaration::{MethodDecl, StatementAnnotation},
    error::{Result, Site},
    mapping::TableMapping,
    strategy::{self, PlanContext},
    template::{self, Marker, Template},
    types::result_ok_type
};

/// The closed set of statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatementKind {
    /// Row query mapped to entities.
    Select,
    /// Scalar `COUNT(*)` query.
    Count,
    /// Single-row insert.
    Insert,
    /// Multi-row insert expanded at runtime.
    BatchInsert,
    /// Update by identity.
    Update,
    /// Delete by identity.
    Delete
}

impl StatementKind {
    /// Kinds in the order used when a method carries several annotations.
    pub const PRIORITY: [Self; 6] = [
        Self::Select,
        Self::Count,
        Self::Insert,
        Self::BatchInsert,
        Self::Update,
        Self::Delete
    ];

    /// Attribute name marking a method with this kind.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Count => "count",
            Self::Insert => "insert",
            Self::BatchInsert => "batch_insert",
            Self::Update => "update",
            Self::Delete => "delete"
        }
    }

    /// Kind for an attribute name.
    #[must_use]
    pub fn from_attribute(name: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|kind| kind.attribute() == name)
    }

    /// Leading SQL keyword of a complete statement of this kind.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Select | Self::Count => "SELECT",
            Self::Insert | Self::BatchInsert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE"
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// What the generated method hands back inside `Ok(..)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// One entity; `optional` for `Option<Entity>`.
    SingleEntity {
        /// No row yields `None` instead of an error.
        optional: bool
    },
    /// `Vec<Entity>`.
    EntityList,
    /// Integer from `COUNT(*)`.
    ScalarCount,
    /// Integer from the number of affected rows.
    AffectedRowCount,
    /// `()`.
    Void
}

/// Value bound to one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindTarget {
    /// A method parameter, by position.
    Param {
        /// Index into the method parameters.
        index: usize
    },
    /// A field of an entity-typed method parameter.
    Field {
        /// Index of the entity parameter.
        param: usize,
        /// Field name.
        field: String
    }
}

/// One placeholder binding, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    /// Marker in the template; `None` for bindings the statement kind added.
    pub marker: Option<Marker>,

    /// Bound value.
    pub target: BindTarget
}

impl ParameterBinding {
    pub(crate) fn generated(target: BindTarget) -> Self {
        Self {
            marker: None,
            target
        }
    }
}

/// Identity write-back after an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBack {
    /// Index of the `&mut Entity` parameter.
    pub param: usize,

    /// Identity field.
    pub field: String,

    /// Identity column.
    pub column: String,

    /// Identity field is an `Option<_>`.
    pub optional: bool
}

/// Rows expanded by a batch insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRows {
    /// Index of the entity sequence parameter.
    pub param: usize,

    /// Fields bound per row, in column order.
    pub fields: Vec<String>
}

/// Everything needed to render one repository method.
#[derive(Debug, Clone)]
pub struct StatementDescriptor<'a> {
    /// Statement kind.
    pub kind: StatementKind,

    /// Mapping of the repository's entity.
    pub owner: &'a TableMapping,

    /// The method being implemented.
    pub method: &'a MethodDecl,

    /// Template text as written in the annotation.
    pub raw_template: String,

    /// Final SQL with dialect placeholders. For batch inserts this is the
    /// statement head before `VALUES`.
    pub sql: String,

    /// Bindings in placeholder order.
    pub parameter_bindings: Vec<ParameterBinding>,

    /// Result shape.
    pub result_shape: ResultShape,

    /// `T` of the declared `Result<T, E>`.
    pub value_type: Type,

    /// Identity write-back, inserts only.
    pub write_back: Option<WriteBack>,

    /// Row expansion, batch inserts only.
    pub batch: Option<BatchRows>
}

/// Builds descriptors for the methods of one repository.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorBuilder<'a> {
    owner:      &'a TableMapping,
    repository: &'a str,
    config:     &'a GeneratorConfig
}

impl<'a> DescriptorBuilder<'a> {
    /// Create a builder for methods of `repository` operating on `owner`.
    #[must_use]
    pub fn new(owner: &'a TableMapping, repository: &'a str, config: &'a GeneratorConfig) -> Self {
        Self {
            owner,
            repository,
            config
        }
    }

    /// Build the descriptor of one method.
    ///
    /// Returns `Ok(None)` when the method has no statement annotation.
    ///
    /// # Errors
    ///
    /// - [`Error::UnresolvedPlaceholder`](crate::Error::UnresolvedPlaceholder)
    ///   when a bind marker matches no parameter.
    /// - [`Error::Signature`](crate::Error::Signature) when the signature
    ///   does not fit the statement kind.
    pub fn build(&self, method: &'a MethodDecl) -> Result<Option<StatementDescriptor<'a>>> {
        let method_name = method.name.to_string();
        let site = Site {
            repository: self.repository,
            method:     &method_name
        };

        let Some(annotation) = select_annotation(&method.annotations) else {
            tracing::warn!(
                repository = self.repository,
                method = %method_name,
                "method has no statement annotation, skipped"
            );
            return Ok(None);
        };
        if method.annotations.len() > 1 {
            tracing::warn!(
                repository = self.repository,
                method = %method_name,
                kind = %annotation.kind,
                "method has several statement annotations, using the first by priority"
            );
        }

        let value_type = result_ok_type(&method.output)
            .ok_or_else(|| site.signature("generated methods must return `Result<T, E>`"))?;
        let template = Template::parse(&annotation.template, self.owner);
        let bindings = match annotation.kind {
            StatementKind::BatchInsert => Vec::new(),
            _ => template::resolve(&template, method, self.owner, site)?
        };

        let plan = strategy::plan(annotation.kind, &PlanContext {
            site,
            method,
            mapping: self.owner,
            config: self.config,
            template: &template,
            bindings,
            value_type
        })?;

        tracing::debug!(
            repository = self.repository,
            method = %method_name,
            kind = %annotation.kind,
            sql = %plan.sql,
            "built statement descriptor"
        );

        Ok(Some(StatementDescriptor {
            kind: annotation.kind,
            owner: self.owner,
            method,
            raw_template: annotation.template.clone(),
            sql: plan.sql,
            parameter_bindings: plan.bindings,
            result_shape: plan.result_shape,
            value_type: value_type.clone(),
            write_back: plan.write_back,
            batch: plan.batch
        }))
    }

    /// Build descriptors for every annotated method, in declaration order.
    ///
    /// # Errors
    ///
    /// The first error of [`build`](Self::build).
    pub fn build_all(&self, methods: &'a [MethodDecl]) -> Result<Vec<StatementDescriptor<'a>>> {
        let mut descriptors = Vec::with_capacity(methods.len());
        for method in methods {
            if let Some(descriptor) = self.build(method)? {
                descriptors.push(descriptor);
            }
        }
        Ok(descriptors)
    }
}

fn select_annotation(annotations: &[StatementAnnotation]) -> Option<&StatementAnnotation> {
    StatementKind::PRIORITY.iter().find_map(|kind| {
        annotations
            .iter()
            .find(|annotation| annotation.kind == *kind)
    })
}
