// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entities and repositories in separate modules, MySQL dialect.

daogen::daogen! {
    #![daogen(dialect = "mysql")]

    pub mod model {
        #[table(name = "orders")]
        pub struct Order {
            #[id("order_id", generated)]
            pub id: u64,
            pub r#type: String,
            pub total: i64
        }
    }

    pub mod dao {
        #[dao_gen(model = super::model::Order, file_name = "orders")]
        pub trait OrderDao {
            #[select("where type = ?kind order by id")]
            async fn by_type(&self, kind: &str) -> Result<Vec<super::model::Order>, sqlx::Error>;

            #[insert]
            async fn insert(&self, order: &mut super::model::Order) -> Result<u64, sqlx::Error>;

            #[delete("where order_id = ?id and total = 0")]
            async fn delete_empty(&self, id: u64) -> Result<u64, sqlx::Error>;
        }
    }
}

fn main() {
    fn _check_trait<T: dao::OrderDao>() {}
    _check_trait::<sqlx::MySqlPool>();
}
