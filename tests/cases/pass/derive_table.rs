// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[derive(Table)]` constants and a `#[dao_gen]` trait outside `daogen!`.

use daogen::Table;

#[derive(Debug, Table)]
#[table(name = "users")]
pub struct User {
    #[id(generated)]
    pub id: i64,

    pub name: String,

    #[column("email_addr")]
    pub email_address: String,

    #[ignored]
    pub cache: Option<String>,
}

#[daogen::dao_gen(model = User)]
pub trait UserDao {
    #[count]
    async fn total(&self) -> Result<i64, sqlx::Error>;
}

fn main() {
    assert_eq!(User::TABLE, "users");
    assert_eq!(User::COLUMNS, &["id", "name", "email_addr"]);

    fn _check_trait<T: UserDao>() {}
}
