// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Whole generation runs driven through `SourceFile`.

use daogen_core::{
    DeclarationSource, DescriptorBuilder, Dialect, Error, FsEmitter, GENERATED_HEADER,
    GeneratedUnit, Generator, MemoryEmitter, ResultShape, SourceFile
};
use syn::parse_quote;

fn users_file() -> syn::File {
    parse_quote! {
        pub mod model {
            #[table(name = "users")]
            pub struct User {
                #[id(generated)]
                pub id: i64,
                pub name: String,
                #[column("email_addr")]
                pub email_address: String
            }
        }

        pub mod dao {
            use super::model::User;

            #[dao_gen(model = User)]
            pub trait UserDao {
                #[select("where name = ?name")]
                async fn find_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error>;

                #[count("where email_address = ?email")]
                async fn count_by_email(&self, email: &str) -> Result<u32, sqlx::Error>;

                #[insert]
                async fn insert(&self, user: &mut User) -> Result<(), sqlx::Error>;
            }

            #[dao_gen(model = User, file_name = "audit")]
            pub trait AuditDao {
                fn label(&self) -> &'static str {
                    "audit"
                }
            }
        }
    }
}

fn run(file: &syn::File) -> (daogen_core::RunReport, Vec<GeneratedUnit>) {
    let source = SourceFile::parse(file, "").unwrap();
    let mut emitter = MemoryEmitter::new();
    let report = Generator::new(source.config().clone())
        .run(&source, &mut emitter)
        .unwrap();
    (report, emitter.into_units())
}

#[test]
fn generates_every_repository() {
    let (report, units) = run(&users_file());
    assert!(report.is_success());
    assert_eq!(report.entities, 1);
    assert_eq!(report.emitted, vec!["dao::UserDao", "dao::AuditDao"]);

    let users = &units[0];
    assert_eq!(users.file_name, "user_dao.rs");
    assert_eq!(users.methods, 3);
    let text = users.text();
    assert!(text.starts_with(GENERATED_HEADER));
    assert!(text.contains("\"SELECT id, name, email_addr FROM users where name = $1\""));
    assert!(text.contains("\"SELECT COUNT(*) FROM users where email_addr = $1\""));
    assert!(text.contains("\"INSERT INTO users (name, email_addr) VALUES ($1, $2) RETURNING id\""));
    assert!(text.contains("impl UserDao for sqlx :: PgPool"));
    assert!(text.contains("Ok (super :: model :: User {"));
}

#[test]
fn repository_without_annotations_gets_an_empty_impl() {
    let (_, units) = run(&users_file());
    let audit = &units[1];
    assert_eq!(audit.file_name, "audit.rs");
    assert_eq!(audit.methods, 0);
    let text = audit.text();
    assert!(text.contains("impl AuditDao for sqlx :: PgPool"));
    assert!(!text.contains("fn from_row"));
    assert!(!text.contains("fn narrow"));
}

#[test]
fn output_is_deterministic() {
    let (_, first) = run(&users_file());
    let (_, second) = run(&users_file());
    let first: Vec<String> = first.iter().map(GeneratedUnit::text).collect();
    let second: Vec<String> = second.iter().map(GeneratedUnit::text).collect();
    assert_eq!(first, second);
}

#[test]
fn descriptor_of_find_by_name() {
    let file = users_file();
    let source = SourceFile::parse(&file, "").unwrap();
    let generator = Generator::default();
    let registry = generator.collect_entities(&source).unwrap();
    let repository = &source.repositories()[0];
    let owner = daogen_core::resolve_model(repository, &registry).unwrap();

    let descriptor = DescriptorBuilder::new(owner, &repository.qualified_name, generator.config())
        .build(&repository.methods[0])
        .unwrap()
        .unwrap();
    assert_eq!(descriptor.sql, "SELECT id, name, email_addr FROM users where name = $1");
    assert_eq!(descriptor.parameter_bindings.len(), 1);
    assert_eq!(descriptor.result_shape, ResultShape::EntityList);
}

#[test]
fn failing_repository_does_not_stop_the_run() {
    let file: syn::File = parse_quote! {
        #[table(name = "users")]
        pub struct User {
            #[id]
            pub id: i64,
            pub name: String
        }

        #[dao_gen(model = User)]
        pub trait BrokenDao {
            #[count]
            async fn total(&self) -> Result<String, sqlx::Error>;
        }

        #[dao_gen(model = Order)]
        pub trait OrderDao {}

        #[dao_gen(model = User)]
        pub trait UserDao {
            #[select("where name = ?missing")]
            async fn find(&self, name: &str) -> Result<Vec<User>, sqlx::Error>;
        }

        #[dao_gen(model = User)]
        pub trait GoodDao {
            #[delete]
            async fn delete(&self, id: i64) -> Result<u64, sqlx::Error>;
        }
    };
    let (report, units) = run(&file);

    assert_eq!(report.emitted, vec!["GoodDao"]);
    assert_eq!(units.len(), 1);
    assert!(matches!(report.failures[0], Error::Signature { ref method, .. } if method == "total"));
    assert!(matches!(report.failures[1], Error::UnknownEntity { ref entity, .. } if entity == "Order"));
    assert!(
        matches!(report.failures[2], Error::UnresolvedPlaceholder { ref marker, .. } if marker == "?missing")
    );
}

#[test]
fn configuration_errors_abort_the_run() {
    let file: syn::File = parse_quote! {
        #[table]
        pub struct User {
            #[id]
            pub id: i64
        }

        #[dao_gen(model = User)]
        pub trait UserDao {}
    };
    let source = SourceFile::parse(&file, "").unwrap();
    let err = Generator::default()
        .run(&source, &mut MemoryEmitter::new())
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn dialect_comes_from_inner_attribute() {
    let file: syn::File = parse_quote! {
        #![daogen(dialect = "sqlite")]

        #[table(name = "users")]
        pub struct User {
            #[id(generated)]
            pub id: i64,
            pub name: String
        }

        #[dao_gen(model = User)]
        pub trait UserDao {
            #[insert]
            async fn insert(&self, user: &mut User) -> Result<u64, sqlx::Error>;
        }
    };
    let source = SourceFile::parse(&file, "").unwrap();
    assert_eq!(source.config().dialect, Dialect::Sqlite);

    let (_, units) = run(&file);
    let text = units[0].text();
    assert!(text.contains("\"INSERT INTO users (name) VALUES (?)\""));
    assert!(text.contains("last_insert_rowid"));
    assert!(text.contains("impl UserDao for sqlx :: SqlitePool"));
}

#[test]
fn fs_emitter_writes_build_script_output() {
    let dir = std::env::temp_dir().join(format!("daogen-generation-{}", std::process::id()));
    let file = users_file();
    let source = SourceFile::parse(&file, "crate").unwrap();
    let report = Generator::default()
        .run(&source, &mut FsEmitter::new(&dir))
        .unwrap();
    assert_eq!(report.emitted, vec!["crate::dao::UserDao", "crate::dao::AuditDao"]);

    let written = std::fs::read_to_string(dir.join("user_dao.rs")).unwrap();
    assert!(written.starts_with(GENERATED_HEADER));
    assert!(written.contains("impl UserDao for sqlx :: PgPool"));
    assert!(dir.join("audit.rs").exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn build_script_reads_documented_attribute_forms() {
    let dir = std::env::temp_dir().join(format!("daogen-build-script-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let db = dir.join("db.rs");
    std::fs::write(
        &db,
        r#"
        #[derive(Debug, daogen::Table)]
        #[table(name = "users")]
        pub struct User {
            #[id]
            pub id: i64,
            pub name: String
        }

        #[daogen::dao_gen(model = User, file_name = "users")]
        pub trait UserDao {
            #[count]
            async fn total(&self) -> Result<i64, sqlx::Error>;

            #[update("name = (select name from users where id = ?src)")]
            async fn copy_name(&self, id: i64, src: i64) -> Result<u64, sqlx::Error>;

            #[delete("using (select id from archive where name = ?name) a")]
            async fn purge(&self, id: i64, name: &str) -> Result<u64, sqlx::Error>;
        }
        "#
    )
    .unwrap();

    let source = SourceFile::from_path(&db, "crate::db").unwrap();
    assert_eq!(source.repositories().len(), 1);
    let out = dir.join("out");
    let report = Generator::new(source.config().clone())
        .run(&source, &mut FsEmitter::new(&out))
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.emitted, vec!["crate::db::UserDao"]);

    let written = std::fs::read_to_string(out.join("users.rs")).unwrap();
    assert!(written.contains("impl UserDao for sqlx :: PgPool"));
    assert!(written.contains(
        "\"UPDATE users SET name = (select name from users where id = $1) WHERE id = $2\""
    ));
    assert!(written.contains(
        "\"DELETE FROM users using (select id from archive where name = $1) a WHERE id = $2\""
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}
