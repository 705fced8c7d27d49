// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Database dialect configuration.
//!
//! This module defines [`Dialect`], which controls database-specific syntax in
//! generated code: parameter placeholders, sqlx pool/row types, and how a
//! database-generated identity is read back after an insert.

use darling::FromMeta;
use proc_macro2::TokenStream;
use quote::quote;

/// Database dialect for code generation.
///
/// # Supported Databases
///
/// | Dialect | Placeholders | Pool | Generated identity |
/// |---------|--------------|------|--------------------|
/// | PostgreSQL | `$1, $2, ...` | `sqlx::PgPool` | `RETURNING <id>` |
/// | MySQL | `?, ?, ...` | `sqlx::MySqlPool` | `last_insert_id()` |
/// | SQLite | `?, ?, ...` | `sqlx::SqlitePool` | `last_insert_rowid()` |
///
/// # Examples
///
/// ```rust,ignore
/// daogen! {
///     #![daogen(dialect = "mysql")]
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// PostgreSQL via `sqlx::PgPool`.
    #[default]
    Postgres,

    /// MySQL / MariaDB via `sqlx::MySqlPool`.
    MySql,

    /// SQLite via `sqlx::SqlitePool`.
    Sqlite
}

impl Dialect {
    /// Placeholder for the parameter at the given index (1-based).
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${index}"),
            Self::MySql | Self::Sqlite => "?".to_owned()
        }
    }

    /// Pool type the generated repository is implemented for.
    #[must_use]
    pub fn pool_type(&self) -> TokenStream {
        match self {
            Self::Postgres => quote!(sqlx::PgPool),
            Self::MySql => quote!(sqlx::MySqlPool),
            Self::Sqlite => quote!(sqlx::SqlitePool)
        }
    }

    /// Row type handed to the generated row mapper.
    #[must_use]
    pub fn row_type(&self) -> TokenStream {
        match self {
            Self::Postgres => quote!(sqlx::postgres::PgRow),
            Self::MySql => quote!(sqlx::mysql::MySqlRow),
            Self::Sqlite => quote!(sqlx::sqlite::SqliteRow)
        }
    }

    /// Database marker type used by `sqlx::QueryBuilder`.
    #[must_use]
    pub fn database_type(&self) -> TokenStream {
        match self {
            Self::Postgres => quote!(sqlx::Postgres),
            Self::MySql => quote!(sqlx::MySql),
            Self::Sqlite => quote!(sqlx::Sqlite)
        }
    }

    /// Check if generated identities are read with a RETURNING clause.
    #[must_use]
    pub fn supports_returning(&self) -> bool {
        matches!(self, Self::Postgres)
    }
}

impl FromMeta for Dialect {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(darling::Error::unknown_value(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_placeholders_are_numbered() {
        let d = Dialect::Postgres;
        assert_eq!(d.placeholder(1), "$1");
        assert_eq!(d.placeholder(12), "$12");
    }

    #[test]
    fn mysql_and_sqlite_placeholders_are_anonymous() {
        assert_eq!(Dialect::MySql.placeholder(3), "?");
        assert_eq!(Dialect::Sqlite.placeholder(1), "?");
    }

    #[test]
    fn pool_types() {
        assert_eq!(Dialect::Postgres.pool_type().to_string(), "sqlx :: PgPool");
        assert_eq!(Dialect::MySql.pool_type().to_string(), "sqlx :: MySqlPool");
        assert_eq!(
            Dialect::Sqlite.row_type().to_string(),
            "sqlx :: sqlite :: SqliteRow"
        );
    }

    #[test]
    fn only_postgres_returns_identities() {
        assert!(Dialect::Postgres.supports_returning());
        assert!(!Dialect::MySql.supports_returning());
        assert!(!Dialect::Sqlite.supports_returning());
    }

    #[test]
    fn from_meta_aliases() {
        assert_eq!(Dialect::from_string("PG").unwrap(), Dialect::Postgres);
        assert_eq!(Dialect::from_string("postgresql").unwrap(), Dialect::Postgres);
        assert_eq!(Dialect::from_string("MariaDB").unwrap(), Dialect::MySql);
        assert_eq!(Dialect::from_string("sqlite").unwrap(), Dialect::Sqlite);
    }

    #[test]
    fn from_meta_invalid() {
        assert!(Dialect::from_string("oracle").is_err());
        assert!(Dialect::from_string("").is_err());
    }

    #[test]
    fn default_is_postgres() {
        assert_eq!(Dialect::default(), Dialect::Postgres);
    }
}
