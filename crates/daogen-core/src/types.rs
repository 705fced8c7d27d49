// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Classification of declared parameter and return types.
//!
//! Strategies decide result shapes and signature validity from the syntactic
//! form of a type only; nothing here resolves type aliases.
//!
//! | Form | Classified as |
//! |------|---------------|
//! | `User`, `model::User` | entity (owned) |
//! | `&User` / `&mut User` | entity (shared / mutable) |
//! | `Vec<User>`, `&[User]`, `&Vec<User>` | sequence of entity |
//! | `Option<User>` | optional entity |
//! | `i8`..`i128`, `u8`..`u128`, `isize`, `usize` | integral |
//! | `()` | unit |

use syn::{GenericArgument, PathArguments, Type, TypePath};

use crate::mapping::TableMapping;

const INTEGRAL: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize"
];

/// How an entity-typed parameter is received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    /// By value: `User`.
    Owned,
    /// By shared reference: `&User`.
    Shared,
    /// By mutable reference: `&mut User`.
    Mutable
}

/// Strip groups and parentheses around a type.
fn peel(ty: &Type) -> &Type {
    match ty {
        Type::Group(group) => peel(&group.elem),
        Type::Paren(paren) => peel(&paren.elem),
        other => other
    }
}

fn plain_path(ty: &Type) -> Option<&TypePath> {
    match peel(ty) {
        Type::Path(path) if path.qself.is_none() => Some(path),
        _ => None
    }
}

/// First generic type argument of the last path segment named `wrapper`.
fn wrapped<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let segment = plain_path(ty)?.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None
    })
}

/// `T` of `Result<T, E>` (or of a single-argument `Result<T>` alias).
#[must_use]
pub fn result_ok_type(ty: &Type) -> Option<&Type> {
    wrapped(ty, "Result")
}

/// `T` of `Option<T>`.
#[must_use]
pub fn option_inner(ty: &Type) -> Option<&Type> {
    wrapped(ty, "Option")
}

/// Element type of `Vec<T>`, `[T]` or a reference to either.
#[must_use]
pub fn sequence_element(ty: &Type) -> Option<&Type> {
    match peel(ty) {
        Type::Reference(reference) => sequence_element(&reference.elem),
        Type::Slice(slice) => Some(&slice.elem),
        other => wrapped(other, "Vec")
    }
}

/// Check for `()`.
#[must_use]
pub fn is_unit(ty: &Type) -> bool {
    matches!(peel(ty), Type::Tuple(tuple) if tuple.elems.is_empty())
}

/// Check for a primitive integer type.
#[must_use]
pub fn is_integral(ty: &Type) -> bool {
    plain_path(ty)
        .and_then(|path| path.path.get_ident())
        .is_some_and(|ident| INTEGRAL.iter().any(|name| ident == name))
}

/// Check if a type path names the entity of `mapping`.
///
/// The written path, without leading `crate`, `self` or `super`, must be a
/// suffix of the qualified entity name, so `User`, `super::model::User` and
/// `crate::model::User` all name `model::User`.
#[must_use]
pub fn names_entity(ty: &Type, mapping: &TableMapping) -> bool {
    let Some(path) = plain_path(ty) else {
        return false;
    };
    let segments: Vec<String> = path
        .path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .skip_while(|segment| matches!(segment.as_str(), "crate" | "self" | "super"))
        .collect();
    if segments.is_empty() {
        return false;
    }
    let written = segments.join("::");
    let qualified = mapping
        .entity_name
        .strip_prefix("crate::")
        .unwrap_or(&mapping.entity_name);
    qualified == written || qualified.ends_with(&format!("::{written}"))
}

/// Classify an entity-typed parameter.
#[must_use]
pub fn entity_ref(ty: &Type, mapping: &TableMapping) -> Option<EntityRef> {
    match peel(ty) {
        Type::Reference(reference) if names_entity(&reference.elem, mapping) => {
            Some(if reference.mutability.is_some() {
                EntityRef::Mutable
            } else {
                EntityRef::Shared
            })
        }
        other if names_entity(other, mapping) => Some(EntityRef::Owned),
        _ => None
    }
}

/// Check for a sequence of the entity.
#[must_use]
pub fn is_entity_sequence(ty: &Type, mapping: &TableMapping) -> bool {
    sequence_element(ty).is_some_and(|element| names_entity(element, mapping))
}
