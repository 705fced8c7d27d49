// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Insert strategy.
//!
//! An empty template inserts every insertable column from the single entity
//! parameter. Any other template is appended to `INSERT INTO <table>` unless
//! it already starts with `INSERT`.
//!
//! # Identity Write-Back
//!
//! Enabled when the identity is `#[id(generated)]`, the entity parameter is
//! `&mut Entity` and the run allows it:
//!
//! | Dialect | Technique |
//! |---------|-----------|
//! | PostgreSQL | `RETURNING <id>` read with `query_scalar` |
//! | MySQL | `MySqlQueryResult::last_insert_id` |
//! | SQLite | `SqliteQueryResult::last_insert_rowid` |
//!
//! An `Option<_>` identity receives `Some(id)`. PostgreSQL decodes the
//! `RETURNING` column into the field type directly.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Plan, PlanContext, execute, query, rows_or_void};
use crate::{
    descriptor::{
        BindTarget, ParameterBinding, ResultShape, StatementDescriptor, StatementKind, WriteBack
    },
    dialect::Dialect,
    emit::UnitContext,
    error::Result,
    mapping::field_ident,
    types::EntityRef
};

pub(super) fn plan(ctx: &PlanContext<'_>) -> Result<Plan> {
    let shape = rows_or_void(ctx, StatementKind::Insert)?;
    let entity = ctx.single_entity_param();
    let mut writer = ctx.writer();

    if ctx.template.is_empty() {
        let Some((param, _)) = entity.filter(|_| ctx.method.params.len() == 1) else {
            return Err(ctx.site.signature(format!(
                "insert without a template takes exactly one `{}` parameter",
                ctx.entity_name()
            )));
        };
        let columns: Vec<(&str, &str)> = ctx.mapping.insertable_columns().collect();
        if columns.is_empty() {
            return Err(ctx.site.signature(format!(
                "`{}` has no insertable columns",
                ctx.entity_name()
            )));
        }
        let column_list = columns
            .iter()
            .map(|(_, column)| *column)
            .collect::<Vec<_>>()
            .join(", ");
        writer.push(&format!(
            "INSERT INTO {} ({column_list}) VALUES (",
            ctx.mapping.table_name
        ));
        for (position, (field, _)) in columns.iter().enumerate() {
            if position > 0 {
                writer.push(", ");
            }
            writer.push_bind(ParameterBinding::generated(BindTarget::Field {
                param,
                field: (*field).to_owned()
            }));
        }
        writer.push(")");
    } else {
        let prefix = format!("INSERT INTO {}", ctx.mapping.table_name);
        ctx.write_statement(&mut writer, StatementKind::Insert.verb(), &prefix);
    }

    let dialect = ctx.config.dialect;
    let returning_taken = dialect.supports_returning() && ctx.template.has_top_level_keyword("RETURNING");
    let write_back = entity
        .filter(|(_, kind)| *kind == EntityRef::Mutable)
        .filter(|_| ctx.mapping.id_generated && ctx.config.id_write_back && !returning_taken)
        .and_then(|(param, _)| {
            let field = ctx.mapping.id_field.clone()?;
            let column = ctx.mapping.id_column.clone()?;
            Some(WriteBack {
                param,
                field,
                column,
                optional: ctx.mapping.id_optional
            })
        });
    if let Some(write_back) = &write_back
        && dialect.supports_returning()
    {
        writer.push(&format!(" RETURNING {}", write_back.column));
    }

    let mut plan = Plan::new(writer, shape);
    plan.write_back = write_back;
    Ok(plan)
}

pub(super) fn render(descriptor: &StatementDescriptor<'_>, unit: &UnitContext) -> TokenStream {
    let Some(write_back) = &descriptor.write_back else {
        return execute(descriptor);
    };
    let target = &descriptor.method.params[write_back.param].name;
    let field = field_ident(&write_back.field);
    let query = query(descriptor);
    let finish = |rows: TokenStream| match descriptor.result_shape {
        ResultShape::Void => quote! { Ok(()) },
        _ => quote! { Ok(narrow(#rows)?) }
    };

    match unit.dialect {
        Dialect::Postgres => {
            let sql = &descriptor.sql;
            let binds = super::bind_calls(descriptor);
            let finish = finish(quote! { 1u64 });
            quote! {
                let id = sqlx::query_scalar(#sql) #(#binds)* .fetch_one(self).await?;
                #target.#field = id;
                #finish
            }
        }
        Dialect::MySql | Dialect::Sqlite => {
            let last_id = match unit.dialect {
                Dialect::MySql => quote! { result.last_insert_id() },
                _ => quote! { result.last_insert_rowid() }
            };
            let id = if write_back.optional {
                quote! { ::core::option::Option::Some(narrow(#last_id)?) }
            } else {
                quote! { narrow(#last_id)? }
            };
            let finish = finish(quote! { result.rows_affected() });
            quote! {
                let result = #query.execute(self).await?;
                #target.#field = #id;
                #finish
            }
        }
    }
}
