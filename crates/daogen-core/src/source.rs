// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Declaration source backed by Rust items.
//!
//! [`SourceFile`] walks a parsed file, recursing into inline modules, and
//! collects annotated structs and traits.
//!
//! # Attributes
//!
//! | Attribute | On | Meaning |
//! |-----------|----|---------|
//! | `#[table(name = "users")]` | struct | Entity stored in `users` |
//! | `#[id]`, `#[id("col")]`, `#[id(generated)]`, `#[id("col", generated)]` | field | Identity |
//! | `#[column("col")]` | field | Column override |
//! | `#[ignored]` | field | Not persisted |
//! | `#[dao_gen(model = User, file_name = "users")]` | trait | Repository |
//! | `#[select("...")]`, `#[count]`, `#[insert]`, `#[batch_insert]`, `#[update]`, `#[delete]` | trait method | Statement kind and template |
//!
//! # Example
//!
//! ```rust,ignore
//! #[table(name = "users")]
//! pub struct User {
//!     #[id(generated)]
//!     pub id: i64,
//!     pub name: String,
//!     #[column("email_addr")]
//!     pub email_address: String
//! }
//!
//! #[dao_gen(model = User)]
//! pub trait UserDao {
//!     #[select("where name = ?name")]
//!     async fn find_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error>;
//! }
//! ```

use std::{fs, path::Path};

use darling::FromMeta;
use syn::{
    Attribute, Field, FnArg, Item, ItemStruct, ItemTrait, LitStr, Meta, Pat, ReturnType, Token,
    TraitItem, TraitItemFn,
    parse::{Parse, ParseStream},
    parse_quote,
    punctuated::Punctuated
};

use crate::{
    config::{CONFIG_ATTRIBUTE, GeneratorConfig},
    declaration::{
        DeclarationSource, EntityDecl, FieldDecl, IdDecl, MethodDecl, ParamDecl, RepositoryDecl,
        StatementAnnotation
    },
    descriptor::StatementKind,
    error::{Error, Result},
    types::option_inner
};

/// Struct attribute marking an entity.
pub const TABLE_ATTRIBUTE: &str = "table";

/// Trait attribute marking a repository.
pub const REPOSITORY_ATTRIBUTE: &str = "dao_gen";

/// Field attributes of an entity.
pub const FIELD_ATTRIBUTES: &[&str] = &["id", "column", "ignored"];

/// `#[table(...)]` options.
#[derive(Debug, Default, FromMeta)]
#[darling(default)]
struct TableAttr {
    name: Option<String>
}

/// `#[dao_gen(...)]` options.
#[derive(Debug, FromMeta)]
struct DaoGenAttr {
    model: syn::Path,

    #[darling(default)]
    file_name: Option<String>
}

/// Arguments of `#[id(...)]`: an optional column and `generated`, in any
/// order.
#[derive(Debug, Default)]
struct IdArgs {
    column:    Option<String>,
    generated: bool
}

impl Parse for IdArgs {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut args = Self::default();
        while !input.is_empty() {
            if input.peek(LitStr) {
                let lit: LitStr = input.parse()?;
                if args.column.replace(lit.value()).is_some() {
                    return Err(syn::Error::new(lit.span(), "duplicate column in #[id]"));
                }
            } else {
                let ident: syn::Ident = input.parse()?;
                if ident != "generated" {
                    return Err(syn::Error::new(
                        ident.span(),
                        "expected a column name or `generated`"
                    ));
                }
                args.generated = true;
            }
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

/// Entities and repositories declared in one Rust file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    config:       GeneratorConfig,
    entities:     Vec<EntityDecl>,
    repositories: Vec<RepositoryDecl>
}

impl SourceFile {
    /// Collect declarations from a parsed file.
    ///
    /// `module_root` prefixes every qualified name: `""` when the items are
    /// spliced where the file is parsed, `"crate"` for a build script reading
    /// `src/lib.rs`.
    ///
    /// # Errors
    ///
    /// Every malformed attribute, accumulated.
    pub fn parse(file: &syn::File, module_root: &str) -> darling::Result<Self> {
        let mut errors = darling::Error::accumulator();
        let config = errors
            .handle(GeneratorConfig::from_attributes(&file.attrs))
            .unwrap_or_default();
        let mut source = Self {
            config,
            ..Self::default()
        };
        source.collect(&file.items, module_root, &mut errors);
        errors.finish_with(source)
    }

    /// Read and parse a file, typically from a build script.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the file cannot be read, [`Error::Source`] when it
    /// does not parse.
    pub fn from_path(path: impl AsRef<Path>, module_root: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source
        })?;
        let source_error = |reason: String| Error::Source {
            path: path.to_path_buf(),
            reason
        };
        let file = syn::parse_file(&text).map_err(|err| source_error(err.to_string()))?;
        Self::parse(&file, module_root).map_err(|err| source_error(err.to_string()))
    }

    /// Configuration from `#![daogen(...)]`, or the default.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn collect(&mut self, items: &[Item], module: &str, errors: &mut darling::error::Accumulator) {
        for item in items {
            match item {
                Item::Struct(item) if has_attr(&item.attrs, TABLE_ATTRIBUTE) => {
                    if let Some(entity) = errors.handle(entity_from_struct(item, module)) {
                        self.entities.push(entity);
                    }
                }
                Item::Trait(item) if has_attr(&item.attrs, REPOSITORY_ATTRIBUTE) => {
                    if let Some(repository) = errors.handle(repository_from_trait(item, module)) {
                        self.repositories.push(repository);
                    }
                }
                Item::Mod(item) => {
                    if let Some((_, items)) = &item.content {
                        let nested = qualify(module, &item.ident.to_string());
                        self.collect(items, &nested, errors);
                    }
                }
                _ => {}
            }
        }
    }
}

impl DeclarationSource for SourceFile {
    fn entities(&self) -> &[EntityDecl] {
        &self.entities
    }

    fn repositories(&self) -> &[RepositoryDecl] {
        &self.repositories
    }
}

/// Entity declaration of a `#[table]` struct in `module`.
///
/// # Errors
///
/// Malformed `#[table]`, `#[id]` or `#[column]`, or unnamed fields.
pub fn entity_from_struct(item: &ItemStruct, module: &str) -> darling::Result<EntityDecl> {
    let table = match find_attr(&item.attrs, TABLE_ATTRIBUTE) {
        Some(attr) if matches!(attr.meta, Meta::List(_)) => TableAttr::from_meta(&attr.meta)?,
        _ => TableAttr::default()
    };

    let mut errors = darling::Error::accumulator();
    let fields = item
        .fields
        .iter()
        .filter_map(|field| errors.handle(field_decl(field)))
        .collect();
    errors.finish()?;

    Ok(EntityDecl {
        qualified_name: qualify(module, &item.ident.to_string()),
        table_name: table.name,
        fields
    })
}

fn field_decl(field: &Field) -> darling::Result<FieldDecl> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| darling::Error::custom("table fields must be named").with_span(field))?;
    let mut decl = FieldDecl {
        name: ident.to_string(),
        ..FieldDecl::default()
    };

    for attr in &field.attrs {
        if attr.path().is_ident("column") {
            decl.column = Some(attr.parse_args::<LitStr>()?.value());
        } else if attr.path().is_ident("id") {
            let args = match attr.meta {
                Meta::Path(_) => IdArgs::default(),
                _ => attr.parse_args::<IdArgs>()?
            };
            decl.id = Some(IdDecl {
                column:    args.column,
                generated: args.generated,
                optional:  option_inner(&field.ty).is_some()
            });
        } else if attr.path().is_ident("ignored") {
            decl.ignored = true;
        }
    }
    Ok(decl)
}

/// Repository declaration of a `#[dao_gen]` trait in `module`.
///
/// # Errors
///
/// Malformed `#[dao_gen]` or statement attributes, annotated methods that
/// are not `async fn(&self, ..)` or bind parameters with patterns.
pub fn repository_from_trait(item: &ItemTrait, module: &str) -> darling::Result<RepositoryDecl> {
    let attr = find_attr(&item.attrs, REPOSITORY_ATTRIBUTE)
        .ok_or_else(|| darling::Error::custom("missing #[dao_gen(model = ...)]").with_span(item))?;
    let options = DaoGenAttr::from_meta(&attr.meta)?;

    let mut errors = darling::Error::accumulator();
    let methods = item
        .items
        .iter()
        .filter_map(|item| match item {
            TraitItem::Fn(method) => errors.handle(method_decl(method)),
            _ => None
        })
        .collect();
    errors.finish()?;

    Ok(RepositoryDecl {
        qualified_name: qualify(module, &item.ident.to_string()),
        model: path_string(&options.model),
        file_name: options.file_name,
        methods
    })
}

fn method_decl(method: &TraitItemFn) -> darling::Result<MethodDecl> {
    let sig = &method.sig;
    let mut annotations = Vec::new();
    for attr in &method.attrs {
        let Some(kind) = statement_kind(attr) else {
            continue;
        };
        let template = match attr.meta {
            Meta::Path(_) => String::new(),
            _ => attr.parse_args::<LitStr>()?.value()
        };
        annotations.push(StatementAnnotation {
            kind,
            template
        });
    }

    let annotated = !annotations.is_empty();
    if annotated {
        if sig.asyncness.is_none() {
            return Err(darling::Error::custom("generated methods must be `async fn`").with_span(sig));
        }
        let takes_ref_self = matches!(
            sig.inputs.first(),
            Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
        );
        if !takes_ref_self {
            return Err(darling::Error::custom("generated methods must take `&self`").with_span(sig));
        }
    }

    let mut params = Vec::new();
    for input in &sig.inputs {
        let FnArg::Typed(typed) = input else {
            continue;
        };
        match &*typed.pat {
            Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => {
                params.push(ParamDecl {
                    name: pat.ident.clone(),
                    ty:   (*typed.ty).clone()
                });
            }
            _ if annotated => {
                return Err(darling::Error::custom(
                    "parameters of generated methods must be plain identifiers"
                )
                .with_span(&typed.pat));
            }
            _ => {}
        }
    }

    let output = match &sig.output {
        ReturnType::Default => parse_quote!(()),
        ReturnType::Type(_, ty) => (**ty).clone()
    };

    Ok(MethodDecl {
        name: sig.ident.clone(),
        params,
        output,
        annotations
    })
}

/// Remove generator attributes so the items compile as plain Rust.
///
/// Structs deriving `Table` keep their attributes for the derive. Repository
/// traits gain `#[async_trait::async_trait]` when missing.
pub fn strip_generator_attributes(file: &mut syn::File) {
    file.attrs
        .retain(|attr| !attr.path().is_ident(CONFIG_ATTRIBUTE));
    strip_items(&mut file.items);
}

fn strip_items(items: &mut [Item]) {
    for item in items {
        match item {
            Item::Struct(item) if has_attr(&item.attrs, TABLE_ATTRIBUTE) => {
                if !derives_table(item) {
                    strip_struct(item);
                }
            }
            Item::Trait(item) if has_attr(&item.attrs, REPOSITORY_ATTRIBUTE) => {
                item.attrs
                    .retain(|attr| !is_attr(attr, REPOSITORY_ATTRIBUTE));
                strip_trait(item);
            }
            Item::Mod(item) => {
                if let Some((_, items)) = &mut item.content {
                    strip_items(items);
                }
            }
            _ => {}
        }
    }
}

fn strip_struct(item: &mut ItemStruct) {
    item.attrs
        .retain(|attr| !is_attr(attr, TABLE_ATTRIBUTE));
    for field in item.fields.iter_mut() {
        field.attrs.retain(|attr| {
            !FIELD_ATTRIBUTES
                .iter()
                .any(|name| attr.path().is_ident(name))
        });
    }
}

/// Remove statement attributes from trait methods and make sure the trait
/// is an `async_trait`.
pub fn strip_trait(item: &mut ItemTrait) {
    for trait_item in &mut item.items {
        if let TraitItem::Fn(method) = trait_item {
            method.attrs.retain(|attr| statement_kind(attr).is_none());
        }
    }
    let is_async_trait = item.attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "async_trait")
    });
    if !is_async_trait {
        item.attrs.push(parse_quote!(#[async_trait::async_trait]));
    }
}

fn statement_kind(attr: &Attribute) -> Option<StatementKind> {
    attr.path()
        .get_ident()
        .and_then(|ident| StatementKind::from_attribute(&ident.to_string()))
}

fn derives_table(item: &ItemStruct) -> bool {
    item.attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .any(|path| {
            path.segments
                .last()
                .is_some_and(|segment| segment.ident == "Table")
        })
}

/// Match `#[name]` as well as path-qualified forms like `#[daogen::name]`.
fn is_attr(attr: &Attribute, name: &str) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == name)
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| is_attr(attr, name))
}

fn has_attr(attrs: &[Attribute], name: &str) -> bool {
    find_attr(attrs, name).is_some()
}

fn qualify(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_owned()
    } else {
        format!("{module}::{name}")
    }
}

fn path_string(path: &syn::Path) -> String {
    let segments = path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::");
    if path.leading_colon.is_some() {
        format!("::{segments}")
    } else {
        segments
    }
}
