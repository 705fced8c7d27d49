// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Update strategy.
//!
//! An empty template with an entity parameter sets every non-identity
//! column and restricts by identity:
//!
//! ```sql
//! UPDATE users SET name = $1, email_addr = $2 WHERE id = $3
//! ```
//!
//! Any other template is appended to `UPDATE <table> SET` unless it already
//! starts with `UPDATE`. A leading `SET` replaces the generated one. Without a
//! top-level `WHERE` the statement is restricted by identity, so a `WHERE`
//! inside a subquery does not count.

use super::{Plan, PlanContext};
use crate::{
    descriptor::{BindTarget, ParameterBinding, StatementKind},
    error::Result
};

pub(super) fn plan(ctx: &PlanContext<'_>) -> Result<Plan> {
    let table = &ctx.mapping.table_name;
    let prefix = if ctx.template.starts_with_keyword("SET") {
        format!("UPDATE {table}")
    } else {
        format!("UPDATE {table} SET")
    };

    ctx.plan_by_identity(StatementKind::Update, &prefix, |writer, identity| {
        let Some((param, _)) = ctx.single_entity_param() else {
            return Err(ctx.site.signature(format!(
                "update without a template takes a `{}` parameter",
                ctx.entity_name()
            )));
        };
        let columns: Vec<(&str, &str)> = ctx.mapping.non_id_columns().collect();
        if columns.is_empty() {
            return Err(ctx.site.signature(format!(
                "`{}` has no columns besides its identity",
                ctx.entity_name()
            )));
        }
        writer.push(&format!("UPDATE {table} SET "));
        for (position, (field, column)) in columns.into_iter().enumerate() {
            if position > 0 {
                writer.push(", ");
            }
            writer.push(&format!("{column} = "));
            writer.push_bind(ParameterBinding::generated(BindTarget::Field {
                param,
                field: field.to_owned()
            }));
        }
        let id_column = ctx.mapping.id_column.as_deref().unwrap_or_default();
        writer.push(&format!(" WHERE {id_column} = "));
        writer.push_bind(identity);
        Ok(())
    })
}
