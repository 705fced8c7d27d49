// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # daogen
//!
//! Compile-time data access objects for `sqlx`. Re-exports:
//! - [`daogen!`], [`Table`] and [`dao_gen`] from `daogen-impl`
//! - The engine from `daogen-core` ([`Generator`], [`SourceFile`],
//!   [`FsEmitter`], ...) for build scripts
//!
//! Generated code refers to `sqlx` and `async_trait`, so both must be
//! dependencies of the crate using it.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! daogen::daogen! {
//!     #[table(name = "users")]
//!     pub struct User {
//!         #[id(generated)]
//!         pub id: i64,
//!         pub name: String,
//!         #[column("email_addr")]
//!         pub email_address: String
//!     }
//!
//!     #[dao_gen(model = User)]
//!     pub trait UserDao {
//!         #[select("where name = ?name")]
//!         async fn find_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error>;
//!
//!         #[count]
//!         async fn total(&self) -> Result<i64, sqlx::Error>;
//!     }
//! }
//!
//! let users = pool.find_by_name("ann").await?;
//! ```
//!
//! # Build Script
//!
//! ```rust,ignore
//! // build.rs
//! let source = daogen::SourceFile::from_path("src/db.rs", "crate::db")?;
//! let out = std::env::var("OUT_DIR")?;
//! daogen::Generator::new(source.config().clone())
//!     .run(&source, &mut daogen::FsEmitter::new(out))?;
//!
//! // src/db.rs
//! #[derive(daogen::Table)]
//! #[table(name = "users")]
//! pub struct User { /* ... */ }
//!
//! #[daogen::dao_gen(model = User)]
//! pub trait UserDao { /* ... */ }
//!
//! include!(concat!(env!("OUT_DIR"), "/user_dao.rs"));
//! ```

pub use daogen_core::*;
pub use daogen_impl::{Table, dao_gen, daogen};
