// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `daogen!` expansion.
//!
//! ```text
//! input items
//!   │
//!   ├─► SourceFile::parse        (attribute errors → compile_error!)
//!   ├─► Generator::run           (entity errors → compile_error!)
//!   └─► strip attributes
//!         │
//!         ▼
//!   items, each unit inside its trait's module, compile_error! per failure
//! ```
//!
//! Inner attributes other than `#![daogen(...)]` cannot be re-emitted in
//! item position and are dropped.

use daogen_core::{Generator, MemoryEmitter, SourceFile, strip_generator_attributes};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse_macro_input;

/// Main entry point for the `daogen!` macro.
pub fn expand(input: TokenStream) -> TokenStream {
    let mut file = parse_macro_input!(input as syn::File);

    match generate(&mut file) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into()
    }
}

fn generate(file: &mut syn::File) -> darling::Result<TokenStream2> {
    let source = SourceFile::parse(file, "")?;
    let mut emitter = MemoryEmitter::new();
    let report = Generator::new(source.config().clone())
        .run(&source, &mut emitter)
        .map_err(darling::Error::custom)?;

    strip_generator_attributes(file);
    for unit in emitter.units() {
        let module: Vec<&str> = unit
            .repository
            .rsplit_once("::")
            .map_or_else(Vec::new, |(module, _)| module.split("::").collect());
        place(&mut file.items, &module, unit.tokens.clone());
    }
    let items = &file.items;
    let failures = report.failures.iter().map(|err| {
        let message = err.to_string();
        quote! { ::core::compile_error!(#message); }
    });

    Ok(quote! {
        #(#items)*
        #(#failures)*
    })
}

/// Append `tokens` to the inline module at `module`, or to the deepest
/// enclosing one that exists.
fn place(items: &mut Vec<syn::Item>, module: &[&str], tokens: TokenStream2) {
    if let Some((first, rest)) = module.split_first() {
        let inner = items.iter_mut().find_map(|item| match item {
            syn::Item::Mod(inner) if inner.ident == *first => {
                inner.content.as_mut().map(|(_, items)| items)
            }
            _ => None
        });
        if let Some(inner) = inner {
            return place(inner, rest, tokens);
        }
    }
    items.push(syn::Item::Verbatim(tokens));
}
