// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Count strategy.
//!
//! `COUNT(*)` is read as `i64` and narrowed to the declared integer type;
//! overflow surfaces as `sqlx::Error::Decode`.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Plan, PlanContext, bind_calls};
use crate::{
    descriptor::{ResultShape, StatementDescriptor, StatementKind},
    error::Result,
    types::is_integral
};

pub(super) fn plan(ctx: &PlanContext<'_>) -> Result<Plan> {
    if !is_integral(ctx.value_type) {
        return Err(ctx.site.signature(format!(
            "count must return an integer type, found `{}`",
            ctx.type_name()
        )));
    }

    let mut writer = ctx.writer();
    let prefix = format!("SELECT COUNT(*) FROM {}", ctx.mapping.table_name);
    ctx.write_statement(&mut writer, StatementKind::Count.verb(), &prefix);
    Ok(Plan::new(writer, ResultShape::ScalarCount))
}

pub(super) fn render(descriptor: &StatementDescriptor<'_>) -> TokenStream {
    let sql = &descriptor.sql;
    let binds = bind_calls(descriptor);
    quote! {
        let count: i64 = sqlx::query_scalar(#sql) #(#binds)* .fetch_one(self).await?;
        Ok(narrow(count)?)
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use crate::{
        config::GeneratorConfig,
        descriptor::{ResultShape, StatementKind},
        dialect::Dialect,
        error::Error,
        strategy::fixtures::{build, method, param, user}
    };

    #[test]
    fn counts_with_fragment() {
        let mapping = user(false);
        let config = GeneratorConfig::default().with_dialect(Dialect::MySql);
        let method = method(
            StatementKind::Count,
            "where name = ?",
            vec![param("name", parse_quote!(&str))],
            parse_quote!(Result<u32, sqlx::Error>)
        );
        let descriptor = build(&mapping, &config, &method).unwrap();
        assert_eq!(descriptor.result_shape, ResultShape::ScalarCount);
        assert_eq!(descriptor.sql, "SELECT COUNT(*) FROM users where name = ?");
    }

    #[test]
    fn non_numeric_return_is_rejected() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::Count,
            "",
            Vec::new(),
            parse_quote!(Result<String, sqlx::Error>)
        );
        let err = build(&mapping, &config, &method).unwrap_err();
        assert!(matches!(err, Error::Signature { .. }));
    }

    #[test]
    fn rendered_body_narrows_count() {
        let mapping = user(false);
        let config = GeneratorConfig::default();
        let method = method(
            StatementKind::Count,
            "",
            Vec::new(),
            parse_quote!(Result<usize, sqlx::Error>)
        );
        let descriptor = build(&mapping, &config, &method).unwrap();
        let body = super::render(&descriptor).to_string();
        assert!(body.contains("query_scalar"));
        assert!(body.contains("narrow (count)"));
    }
}
