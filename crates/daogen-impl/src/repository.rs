// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[dao_gen(...)]` attribute expansion.

use daogen_core::{REPOSITORY_ATTRIBUTE, repository_from_trait, strip_trait};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{ItemTrait, parse_macro_input, parse_quote};

/// Main entry point for the `dao_gen` attribute.
pub fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut item = parse_macro_input!(item as ItemTrait);
    let attr = TokenStream2::from(attr);
    let name = format_ident!("{}", REPOSITORY_ATTRIBUTE);

    // Validate the trait as the build script reads it, attribute included.
    item.attrs.push(parse_quote!(#[#name(#attr)]));
    if let Err(err) = repository_from_trait(&item, "") {
        return err.write_errors().into();
    }

    item.attrs
        .retain(|attr| !attr.path().is_ident(REPOSITORY_ATTRIBUTE));
    strip_trait(&mut item);
    quote!(#item).into()
}
