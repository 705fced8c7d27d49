// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Batch insert strategy.
//!
//! The template is an optional comma-separated list of fields or columns;
//! empty means every insertable column. Rows are expanded at runtime with
//! `sqlx::QueryBuilder::push_values`, so the template takes no bind markers.
//! An empty input sequence returns `Ok(0)` without touching the database.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Plan, PlanContext};
use crate::{
    descriptor::{BatchRows, StatementDescriptor, StatementKind},
    emit::UnitContext,
    error::Result,
    mapping::field_ident,
    types::is_entity_sequence
};

pub(super) fn plan(ctx: &PlanContext<'_>) -> Result<Plan> {
    let entity = ctx.entity_name();
    if let Some(marker) = ctx.template.markers().first() {
        return Err(ctx.site.signature(format!(
            "batch_insert lists columns and takes no bind markers, found `{marker}`"
        )));
    }
    let param = match ctx.method.params[..] {
        [ref rows] if is_entity_sequence(&rows.ty, ctx.mapping) => 0,
        _ => {
            return Err(ctx.site.signature(format!(
                "batch_insert takes exactly one `Vec<{entity}>` or `&[{entity}]` parameter"
            )));
        }
    };
    let shape = ctx.affected_rows(StatementKind::BatchInsert)?;

    let columns = if ctx.template.is_empty() {
        ctx.mapping
            .insertable_columns()
            .map(|(field, column)| (field.to_owned(), column.to_owned()))
            .collect()
    } else {
        listed_columns(ctx)?
    };
    if columns.is_empty() {
        return Err(ctx
            .site
            .signature(format!("`{entity}` has no insertable columns")));
    }

    let column_list = columns
        .iter()
        .map(|(_, column)| column.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut writer = ctx.writer();
    writer.push(&format!(
        "INSERT INTO {} ({column_list}) ",
        ctx.mapping.table_name
    ));

    let mut plan = Plan::new(writer, shape);
    plan.batch = Some(BatchRows {
        param,
        fields: columns.into_iter().map(|(field, _)| field).collect()
    });
    Ok(plan)
}

/// `(field, column)` pairs named by the template.
fn listed_columns(ctx: &PlanContext<'_>) -> Result<Vec<(String, String)>> {
    let mut columns: Vec<(String, String)> = Vec::new();
    for name in ctx.template.source().split(',').map(str::trim) {
        let pair = if let Some(column) = ctx.mapping.column_of(name) {
            (name.to_owned(), column.to_owned())
        } else if let Some(field) = ctx.mapping.field_of(name) {
            (field.to_owned(), name.to_owned())
        } else {
            return Err(ctx.site.signature(format!(
                "batch_insert column `{name}` is not a persisted field of `{}`",
                ctx.entity_name()
            )));
        };
        if columns.iter().any(|(field, _)| *field == pair.0) {
            return Err(ctx
                .site
                .signature(format!("batch_insert lists `{name}` twice")));
        }
        columns.push(pair);
    }
    Ok(columns)
}

pub(super) fn render(descriptor: &StatementDescriptor<'_>, unit: &UnitContext) -> TokenStream {
    let Some(batch) = &descriptor.batch else {
        return TokenStream::new();
    };
    let rows = &descriptor.method.params[batch.param].name;
    let fields = batch.fields.iter().map(|field| field_ident(field));
    let sql = &descriptor.sql;
    let database = &unit.database;

    quote! {
        if #rows.is_empty() {
            return Ok(0);
        }
        let mut builder = sqlx::QueryBuilder::<#database>::new(#sql);
        builder.push_values(#rows.iter(), |mut row, item| {
            row #(.push_bind(&item.#fields))*;
        });
        let result = builder.build().execute(self).await?;
        Ok(narrow(result.rows_affected())?)
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use crate::{
        config::GeneratorConfig,
        descriptor::{ResultShape, StatementKind},
        dialect::Dialect,
        emit::UnitContext,
        error::Error,
        strategy::fixtures::{build, method, param, user}
    };

    #[test]
    fn all_insertable_columns_by_default() {
        let mapping = user(true);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::BatchInsert,
            "",
            vec![param("users", parse_quote!(&[User]))],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        let descriptor = build(&mapping, &config, &method).unwrap();
        assert_eq!(descriptor.sql, "INSERT INTO users (name, email_addr) ");
        assert_eq!(descriptor.result_shape, ResultShape::AffectedRowCount);
        assert_eq!(
            descriptor.batch.as_ref().unwrap().fields,
            vec!["name".to_owned(), "email_address".to_owned()]
        );
        assert!(descriptor.parameter_bindings.is_empty());
    }

    #[test]
    fn listed_fields_and_columns() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::BatchInsert,
            "id, email_addr",
            vec![param("users", parse_quote!(Vec<User>))],
            parse_quote!(Result<usize, sqlx::Error>)
        );
        let descriptor = build(&mapping, &config, &method).unwrap();
        assert_eq!(descriptor.sql, "INSERT INTO users (id, email_addr) ");
        assert_eq!(
            descriptor.batch.as_ref().unwrap().fields,
            vec!["id".to_owned(), "email_address".to_owned()]
        );
    }

    #[test]
    fn empty_input_short_circuits() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::BatchInsert,
            "",
            vec![param("users", parse_quote!(&[User]))],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        let descriptor = build(&mapping, &config, &method).unwrap();
        let body = super::render(&descriptor, &UnitContext::for_tests(Dialect::Postgres)).to_string();
        assert!(body.contains("users . is_empty ()"));
        assert!(body.contains("return Ok (0)"));
        assert!(body.contains("push_values"));
        assert!(body.contains("push_bind (& item . email_address)"));
    }

    #[test]
    fn markers_are_rejected() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::BatchInsert,
            "name = ?name",
            vec![param("users", parse_quote!(&[User]))],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        assert!(matches!(
            build(&mapping, &config, &method).unwrap_err(),
            Error::Signature { .. }
        ));
    }

    #[test]
    fn single_entity_parameter_is_rejected() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::BatchInsert,
            "",
            vec![param("user", parse_quote!(&User))],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        assert!(matches!(
            build(&mapping, &config, &method).unwrap_err(),
            Error::Signature { .. }
        ));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::BatchInsert,
            "name, cache",
            vec![param("users", parse_quote!(&[User]))],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        assert!(matches!(
            build(&mapping, &config, &method).unwrap_err(),
            Error::Signature { ref reason, .. } if reason.contains("cache")
        ));
    }
}
