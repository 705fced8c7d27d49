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

//! # daogen-impl
//!
//! Procedural macros of `daogen`. Depend on `daogen` instead.
//!
//! | Macro | Kind | Output |
//! |-------|------|--------|
//! | [`daogen!`](macro@daogen) | function-like | Input items plus one `sqlx` implementation per repository |
//! | [`Table`](derive@Table) | derive | `TABLE` and `COLUMNS` constants, mapping checked at compile time |
//! | [`dao_gen`](macro@dao_gen) | attribute | The trait, ready for a build-script generated implementation |

mod generate;
mod repository;
mod table;

use proc_macro::TokenStream;

/// Generate `sqlx` implementations for every repository trait in the input.
///
/// The input is a sequence of items. `#[table]` structs and `#[dao_gen]`
/// traits are collected, every repository trait is implemented for the pool
/// of the configured dialect, and the items are emitted again without the
/// generator attributes.
///
/// # Example
///
/// ```rust,ignore
/// daogen::daogen! {
///     #![daogen(dialect = "postgres")]
///
///     #[table(name = "users")]
///     pub struct User {
///         #[id(generated)]
///         pub id: i64,
///         pub name: String,
///         #[column("email_addr")]
///         pub email_address: String
///     }
///
///     #[dao_gen(model = User)]
///     pub trait UserDao {
///         #[select("where name = ?name")]
///         async fn find_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error>;
///
///         #[insert]
///         async fn insert(&self, user: &mut User) -> Result<(), sqlx::Error>;
///     }
/// }
///
/// // `sqlx::PgPool` now implements `UserDao`.
/// ```
///
/// Configuration errors abort the expansion. Errors of one repository
/// become a `compile_error!` while the other repositories are still
/// generated.
#[proc_macro]
pub fn daogen(input: TokenStream) -> TokenStream {
    generate::expand(input)
}

/// Check the table mapping of an entity at compile time.
///
/// Generates `TABLE` and `COLUMNS` (identity first) associated constants.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(daogen::Table)]
/// #[table(name = "users")]
/// pub struct User {
///     #[id(generated)]
///     pub id: i64,
///     #[column("email_addr")]
///     pub email_address: String,
///     #[ignored]
///     pub cache: Option<String>
/// }
///
/// assert_eq!(User::TABLE, "users");
/// assert_eq!(User::COLUMNS, &["id", "email_addr"]);
/// ```
#[proc_macro_derive(Table, attributes(table, column, id, ignored))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    table::derive(input)
}

/// Mark a repository trait whose implementation is generated by a build
/// script.
///
/// Validates the repository declaration, strips statement attributes and
/// makes the trait an `async_trait`.
///
/// ```rust,ignore
/// #[daogen::dao_gen(model = crate::model::User, file_name = "users")]
/// pub trait UserDao {
///     #[count("where name = ?name")]
///     async fn count_by_name(&self, name: &str) -> Result<i64, sqlx::Error>;
/// }
///
/// include!(concat!(env!("OUT_DIR"), "/users.rs"));
/// ```
#[proc_macro_attribute]
pub fn dao_gen(attr: TokenStream, item: TokenStream) -> TokenStream {
    repository::expand(attr, item)
}
