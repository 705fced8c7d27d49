// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Delete strategy.
//!
//! An empty template deletes by identity, taken from a parameter named like
//! the identity field or from the single entity parameter. Any other
//! template is appended to `DELETE FROM <table>` unless it already starts
//! with `DELETE`; without a top-level `WHERE` it is restricted by identity.

use super::{Plan, PlanContext};
use crate::{descriptor::StatementKind, error::Result};

pub(super) fn plan(ctx: &PlanContext<'_>) -> Result<Plan> {
    let prefix = format!("DELETE FROM {}", ctx.mapping.table_name);
    let id_column = ctx.mapping.id_column.as_deref().unwrap_or_default();

    ctx.plan_by_identity(StatementKind::Delete, &prefix, |writer, identity| {
        writer.push(&format!("{prefix} WHERE {id_column} = "));
        writer.push_bind(identity);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use crate::{
        config::GeneratorConfig,
        descriptor::{BindTarget, StatementKind},
        dialect::Dialect,
        error::Error,
        strategy::fixtures::{build, method, param, user}
    };

    #[test]
    fn deletes_by_id_parameter() {
        let mapping = user(false);
        let config = GeneratorConfig::default().with_dialect(Dialect::Sqlite);
        let method = method(
            StatementKind::Delete,
            "",
            vec![param("id", parse_quote!(i64))],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        let descriptor = build(&mapping, &config, &method).unwrap();
        assert_eq!(descriptor.sql, "DELETE FROM users WHERE id = ?");
        assert_eq!(descriptor.parameter_bindings[0].target, BindTarget::Param {
            index: 0
        });
    }

    #[test]
    fn deletes_by_entity() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::Delete,
            "",
            vec![param("user", parse_quote!(&User))],
            parse_quote!(Result<u8, sqlx::Error>)
        );
        let descriptor = build(&mapping, &config, &method).unwrap();
        assert_eq!(descriptor.sql, "DELETE FROM users WHERE id = $1");
        assert_eq!(descriptor.parameter_bindings[0].target, BindTarget::Field {
            param: 0,
            field: "id".to_owned()
        });
    }

    #[test]
    fn complete_statement_is_kept() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::Delete,
            "DELETE FROM users WHERE id = ?id AND name = ?name",
            vec![
                param("id", parse_quote!(i64)),
                param("name", parse_quote!(&str)),
            ],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        assert_eq!(
            build(&mapping, &config, &method).unwrap().sql,
            "DELETE FROM users WHERE id = $1 AND name = $2"
        );
    }

    #[test]
    fn subquery_where_still_restricts_by_identity() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::Delete,
            "DELETE FROM users USING (select name from archive where name = ?name) a",
            vec![
                param("id", parse_quote!(i64)),
                param("name", parse_quote!(&str)),
            ],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        let descriptor = build(&mapping, &config, &method).unwrap();
        assert_eq!(
            descriptor.sql,
            "DELETE FROM users USING (select name from archive where name = $1) a WHERE id = $2"
        );
        assert_eq!(descriptor.parameter_bindings[1].target, BindTarget::Param {
            index: 0
        });
    }

    #[test]
    fn no_parameters_is_rejected() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::Delete,
            "",
            Vec::new(),
            parse_quote!(Result<u64, sqlx::Error>)
        );
        assert!(matches!(
            build(&mapping, &config, &method).unwrap_err(),
            Error::Signature { .. }
        ));
    }

    #[test]
    fn parameter_without_identity_is_rejected() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::Delete,
            "",
            vec![param("name", parse_quote!(&str))],
            parse_quote!(Result<u64, sqlx::Error>)
        );
        assert!(matches!(
            build(&mapping, &config, &method).unwrap_err(),
            Error::Signature { .. }
        ));
    }
}
