// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-kind statement strategies.
//!
//! Each statement kind has one module with two functions:
//!
//! - `plan` validates the method signature, infers the [`ResultShape`] and
//!   assembles the final SQL with its bindings.
//! - `render` produces the body of the generated method.
//!
//! # Module Structure
//!
//! ```text
//! strategy/
//! ├── select.rs        — fetch_all / fetch_optional / fetch_one
//! ├── count.rs         — query_scalar COUNT(*)
//! ├── insert.rs        — execute, identity write-back
//! ├── batch_insert.rs  — QueryBuilder::push_values
//! ├── update.rs        — execute by identity
//! └── delete.rs        — execute by identity
//! ```

mod batch_insert;
mod count;
mod delete;
mod insert;
mod select;
mod update;

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::Type;

use crate::{
    config::GeneratorConfig,
    declaration::MethodDecl,
    dialect::Dialect,
    descriptor::{
        BatchRows, BindTarget, ParameterBinding, ResultShape, StatementDescriptor, StatementKind,
        WriteBack
    },
    emit::UnitContext,
    error::{Result, Site},
    mapping::{TableMapping, field_ident},
    template::{SqlWriter, Template},
    types::{EntityRef, entity_ref, is_integral, is_unit}
};

/// Inputs shared by every strategy while planning one method.
pub(crate) struct PlanContext<'a> {
    pub site:       Site<'a>,
    pub method:     &'a MethodDecl,
    pub mapping:    &'a TableMapping,
    pub config:     &'a GeneratorConfig,
    pub template:   &'a Template,
    /// Marker bindings in marker order.
    pub bindings:   Vec<ParameterBinding>,
    pub value_type: &'a Type
}

/// Output of planning one method.
pub(crate) struct Plan {
    pub sql:          String,
    pub bindings:     Vec<ParameterBinding>,
    pub result_shape: ResultShape,
    pub write_back:   Option<WriteBack>,
    pub batch:        Option<BatchRows>
}

impl Plan {
    fn new(writer: SqlWriter, result_shape: ResultShape) -> Self {
        let (sql, bindings) = writer.finish();
        Self {
            sql,
            bindings,
            result_shape,
            write_back: None,
            batch: None
        }
    }
}

/// Plan a method of the given kind.
pub(crate) fn plan(kind: StatementKind, ctx: &PlanContext<'_>) -> Result<Plan> {
    match kind {
        StatementKind::Select => select::plan(ctx),
        StatementKind::Count => count::plan(ctx),
        StatementKind::Insert => insert::plan(ctx),
        StatementKind::BatchInsert => batch_insert::plan(ctx),
        StatementKind::Update => update::plan(ctx),
        StatementKind::Delete => delete::plan(ctx)
    }
}

/// Render the complete generated method of a descriptor.
pub(crate) fn render(descriptor: &StatementDescriptor<'_>, unit: &UnitContext) -> TokenStream {
    let body = match descriptor.kind {
        StatementKind::Select => select::render(descriptor, unit),
        StatementKind::Count => count::render(descriptor),
        StatementKind::Insert => insert::render(descriptor, unit),
        StatementKind::BatchInsert => batch_insert::render(descriptor, unit),
        StatementKind::Update | StatementKind::Delete => execute(descriptor)
    };
    let name = &descriptor.method.name;
    let params = descriptor.method.params.iter().map(|param| {
        let (param_name, ty) = (&param.name, &param.ty);
        quote! { #param_name: #ty }
    });
    let output = &descriptor.method.output;

    quote! {
        async fn #name(&self, #(#params),*) -> #output {
            #body
        }
    }
}

impl PlanContext<'_> {
    fn writer(&self) -> SqlWriter {
        SqlWriter::new(self.config.dialect)
    }

    fn entity_name(&self) -> &str {
        self.mapping.simple_name()
    }

    fn type_name(&self) -> String {
        self.value_type.to_token_stream().to_string()
    }

    /// Entity-typed parameters with how they are received.
    fn entity_params(&self) -> Vec<(usize, EntityRef)> {
        self.method
            .params
            .iter()
            .enumerate()
            .filter_map(|(index, param)| {
                entity_ref(&param.ty, self.mapping).map(|kind| (index, kind))
            })
            .collect()
    }

    /// The only entity-typed parameter, if exactly one exists.
    fn single_entity_param(&self) -> Option<(usize, EntityRef)> {
        match self.entity_params()[..] {
            [one] => Some(one),
            _ => None
        }
    }

    /// Write the template as a complete statement when it starts with
    /// `verb`, otherwise append it to `prefix`.
    fn write_statement(&self, writer: &mut SqlWriter, verb: &str, prefix: &str) {
        if self.template.starts_with_keyword(verb) {
            writer.push_template(self.template, &self.bindings);
            return;
        }
        writer.push(prefix);
        if !self.template.is_empty() {
            writer.push(" ");
            writer.push_template(self.template, &self.bindings);
        }
    }

    /// Integral `T` for affected-row counts.
    fn affected_rows(&self, kind: StatementKind) -> Result<ResultShape> {
        if is_integral(self.value_type) {
            return Ok(ResultShape::AffectedRowCount);
        }
        Err(self.site.signature(format!(
            "{kind} must return an integer number of affected rows, found `{}`",
            self.type_name()
        )))
    }

    /// Identity column, or an error naming the kind that needs it.
    fn require_identity(&self, kind: StatementKind) -> Result<(&str, &str)> {
        self.mapping
            .id_field
            .as_deref()
            .zip(self.mapping.id_column.as_deref())
            .ok_or_else(|| {
                self.site.signature(format!(
                    "{kind} needs an identity but `{}` has no #[id] field",
                    self.entity_name()
                ))
            })
    }

    /// Binding supplying the identity value.
    ///
    /// A parameter named like the identity field wins over the identity
    /// field of the single entity-typed parameter.
    fn identity_binding(&self, id_field: &str) -> Option<ParameterBinding> {
        if let Some(index) = self.method.param_index(id_field)
            && entity_ref(&self.method.params[index].ty, self.mapping).is_none()
        {
            return Some(ParameterBinding::generated(BindTarget::Param {
                index
            }));
        }
        self.single_entity_param().map(|(param, _)| {
            ParameterBinding::generated(BindTarget::Field {
                param,
                field: id_field.to_owned()
            })
        })
    }

    /// Check if the template itself binds a value against the identity
    /// outside any subquery.
    fn template_binds_identity(&self, id_field: &str, id_column: &str) -> bool {
        !self.bindings.is_empty()
            && self
                .template
                .top_level_words()
                .iter()
                .any(|word| word == id_field || word == id_column)
    }

    /// Shared planning of update and delete.
    ///
    /// `generated` writes the statement for an empty template. A template
    /// without a top-level `WHERE` is restricted to the identity.
    fn plan_by_identity(
        &self,
        kind: StatementKind,
        prefix: &str,
        generated: impl FnOnce(&mut SqlWriter, ParameterBinding) -> Result<()>
    ) -> Result<Plan> {
        let (id_field, id_column) = self.require_identity(kind)?;
        if self.method.params.is_empty() {
            return Err(self
                .site
                .signature(format!("{kind} needs at least one parameter")));
        }
        let shape = self.affected_rows(kind)?;
        let identity = self.identity_binding(id_field);
        let underivable = || {
            self.site.signature(format!(
                "{kind} cannot derive the identity: add a `{id_field}` parameter, a `{}` parameter, or bind `{id_field}` in the template",
                self.entity_name()
            ))
        };

        let mut writer = self.writer();
        if self.template.is_empty() {
            generated(&mut writer, identity.ok_or_else(underivable)?)?;
            return Ok(Plan::new(writer, shape));
        }

        if identity.is_none() && !self.template_binds_identity(id_field, id_column) {
            return Err(underivable());
        }
        self.write_statement(&mut writer, kind.verb(), prefix);
        if !self.template.has_top_level_keyword("WHERE") {
            writer.push(&format!(" WHERE {id_column} = "));
            writer.push_bind(identity.ok_or_else(underivable)?);
        }
        Ok(Plan::new(writer, shape))
    }
}

/// Value expression of a binding.
pub(crate) fn bound_value(method: &MethodDecl, target: &BindTarget) -> TokenStream {
    match target {
        BindTarget::Param {
            index
        } => {
            let name = &method.params[*index].name;
            quote! { &#name }
        }
        BindTarget::Field {
            param,
            field
        } => {
            let name = &method.params[*param].name;
            let field = field_ident(field);
            quote! { &#name.#field }
        }
    }
}

/// `sqlx::query(..)` with every binding applied.
fn query(descriptor: &StatementDescriptor<'_>) -> TokenStream {
    let sql = &descriptor.sql;
    let binds = bind_calls(descriptor);
    quote! { sqlx::query(#sql) #(#binds)* }
}

/// `.bind(..)` calls in placeholder order.
fn bind_calls(descriptor: &StatementDescriptor<'_>) -> Vec<TokenStream> {
    descriptor
        .parameter_bindings
        .iter()
        .map(|binding| {
            let value = bound_value(descriptor.method, &binding.target);
            quote! { .bind(#value) }
        })
        .collect()
}

/// Execute and report affected rows or `()`.
fn execute(descriptor: &StatementDescriptor<'_>) -> TokenStream {
    let query = query(descriptor);
    match descriptor.result_shape {
        ResultShape::Void => quote! {
            #query.execute(self).await?;
            Ok(())
        },
        _ => quote! {
            let result = #query.execute(self).await?;
            Ok(narrow(result.rows_affected())?)
        }
    }
}

/// Check if a descriptor's body calls the generated `narrow` helper.
pub(crate) fn needs_narrow(descriptor: &StatementDescriptor<'_>, dialect: Dialect) -> bool {
    match descriptor.result_shape {
        ResultShape::ScalarCount | ResultShape::AffectedRowCount => true,
        ResultShape::Void => descriptor.write_back.is_some() && !dialect.supports_returning(),
        ResultShape::SingleEntity {
            ..
        }
        | ResultShape::EntityList => false
    }
}

/// Check if a descriptor's body calls the generated row mapper.
pub(crate) fn needs_row_mapper(descriptor: &StatementDescriptor<'_>) -> bool {
    matches!(
        descriptor.result_shape,
        ResultShape::SingleEntity { .. } | ResultShape::EntityList
    )
}

/// Result shape of an insert: affected rows or `()`.
fn rows_or_void(ctx: &PlanContext<'_>, kind: StatementKind) -> Result<ResultShape> {
    if is_unit(ctx.value_type) {
        return Ok(ResultShape::Void);
    }
    if is_integral(ctx.value_type) {
        return Ok(ResultShape::AffectedRowCount);
    }
    Err(ctx.site.signature(format!(
        "{kind} must return `()` or an integer number of affected rows, found `{}`",
        ctx.type_name()
    )))
}
