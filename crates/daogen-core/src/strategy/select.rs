// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Select strategy.
//!
//! | Declared `T` | Result shape | Fetch |
//! |--------------|--------------|-------|
//! | `Vec<Entity>` | entity list | `fetch_all` |
//! | `Option<Entity>` | optional single entity | `fetch_optional` |
//! | `Entity` | single entity | `fetch_one` |
//!
//! A bare `Entity` fails with `sqlx::Error::RowNotFound` when no row matches.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Plan, PlanContext, query};
use crate::{
    descriptor::{ResultShape, StatementDescriptor, StatementKind},
    emit::UnitContext,
    error::Result,
    types::{names_entity, option_inner, sequence_element}
};

pub(super) fn plan(ctx: &PlanContext<'_>) -> Result<Plan> {
    let ty = ctx.value_type;
    let shape = if sequence_element(ty).is_some_and(|element| names_entity(element, ctx.mapping)) {
        ResultShape::EntityList
    } else if option_inner(ty).is_some_and(|inner| names_entity(inner, ctx.mapping)) {
        ResultShape::SingleEntity {
            optional: true
        }
    } else if names_entity(ty, ctx.mapping) {
        ResultShape::SingleEntity {
            optional: false
        }
    } else {
        let entity = ctx.entity_name();
        return Err(ctx.site.signature(format!(
            "select must return `Vec<{entity}>`, `Option<{entity}>` or `{entity}`, found `{}`",
            ctx.type_name()
        )));
    };

    let mut writer = ctx.writer();
    let prefix = format!(
        "SELECT {} FROM {}",
        ctx.mapping.column_list(),
        ctx.mapping.table_name
    );
    ctx.write_statement(&mut writer, StatementKind::Select.verb(), &prefix);
    Ok(Plan::new(writer, shape))
}

pub(super) fn render(descriptor: &StatementDescriptor<'_>, unit: &UnitContext) -> TokenStream {
    let query = query(descriptor);
    let mapper = &unit.row_mapper;

    match descriptor.result_shape {
        ResultShape::EntityList => quote! {
            let rows = #query.fetch_all(self).await?;
            let mut items = ::std::vec::Vec::with_capacity(rows.len());
            for row in &rows {
                items.push(#mapper(row)?);
            }
            Ok(items)
        },
        ResultShape::SingleEntity {
            optional: true
        } => quote! {
            let row = #query.fetch_optional(self).await?;
            match row {
                Some(row) => Ok(Some(#mapper(&row)?)),
                None => Ok(None)
            }
        },
        _ => quote! {
            let row = #query.fetch_one(self).await?;
            Ok(#mapper(&row)?)
        }
    }
}
