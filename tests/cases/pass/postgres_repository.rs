// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Every statement kind against `sqlx::PgPool`.

daogen::daogen! {
    #[table(name = "users")]
    #[derive(Debug, Clone)]
    pub struct User {
        #[id(generated)]
        pub id: i64,
        pub name: String,
        #[column("email_addr")]
        pub email_address: String,
        #[ignored]
        pub cache: Option<String>
    }

    #[dao_gen(model = User)]
    pub trait UserDao {
        #[select("where name = ?name")]
        async fn find_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error>;

        #[select("where id = ?")]
        async fn find(&self, id: i64) -> Result<Option<User>, sqlx::Error>;

        #[select("SELECT id, name, email_addr FROM users ORDER BY id LIMIT 1")]
        async fn first(&self) -> Result<User, sqlx::Error>;

        #[count("where email_address like ?pattern")]
        async fn count_by_email(&self, pattern: &str) -> Result<u32, sqlx::Error>;

        #[insert]
        async fn insert(&self, user: &mut User) -> Result<(), sqlx::Error>;

        #[insert("(name, email_address) values (?name, ?email_address)")]
        async fn insert_named(&self, name: &str, email_address: &str) -> Result<u64, sqlx::Error>;

        #[batch_insert]
        async fn insert_all(&self, users: &[User]) -> Result<u64, sqlx::Error>;

        #[update("name = ?name")]
        async fn rename(&self, id: i64, name: &str) -> Result<u64, sqlx::Error>;

        #[update]
        async fn update(&self, user: &User) -> Result<i32, sqlx::Error>;

        #[delete]
        async fn delete(&self, id: i64) -> Result<u64, sqlx::Error>;

        fn describe(&self) -> &'static str {
            "users"
        }
    }
}

fn main() {
    fn _check_trait<T: UserDao>() {}
    _check_trait::<sqlx::PgPool>();
}
