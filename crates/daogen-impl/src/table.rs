// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[derive(Table)]` expansion.
//!
//! Maps the struct exactly as a generation run would, so a mapping error
//! points at the struct instead of surfacing in a build script.

use daogen_core::{TableMapping, entity_from_struct, map_entity};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Item, ItemStruct, parse_macro_input};

/// Main entry point for the `Table` derive.
pub fn derive(input: TokenStream) -> TokenStream {
    let item = match parse_macro_input!(input as Item) {
        Item::Struct(item) => item,
        other => {
            return syn::Error::new_spanned(other, "Table can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let decl = match entity_from_struct(&item, "") {
        Ok(decl) => decl,
        Err(err) => return err.write_errors().into()
    };
    match map_entity(&decl) {
        Ok(mapping) => generate(&item, &mapping).into(),
        Err(err) => syn::Error::new_spanned(&item.ident, err.to_string())
            .to_compile_error()
            .into()
    }
}

fn generate(item: &ItemStruct, mapping: &TableMapping) -> TokenStream2 {
    let ident = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let table = &mapping.table_name;
    let columns = mapping.columns().map(|(_, column)| column);

    quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Table storing this entity.
            pub const TABLE: &'static str = #table;

            /// Persisted columns, identity first.
            pub const COLUMNS: &'static [&'static str] = &[#(#columns),*];
        }
    }
}
