// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! SQL templates with bind markers.
//!
//! A template is statement text with holes. The scanner does not parse SQL;
//! it only recognizes the lexical pieces below and copies everything else
//! through unchanged.
//!
//! | Piece | Treatment |
//! |-------|-----------|
//! | `?name` | Named bind marker |
//! | `?` | Positional bind marker |
//! | `??` | Literal `?` |
//! | `'text'`, `"ident"`, `` `ident` `` | Copied verbatim, never scanned |
//! | `-- comment`, `/* comment */` | Copied verbatim, never scanned |
//! | bare word equal to a field name | Rewritten to the field's column |
//! | `(` `)` | Nesting depth; keyword checks only see depth 0 |
//!
//! # Binding
//!
//! Markers are resolved against the method parameters in two passes:
//!
//! 1. Named markers bind the parameter with that name. A name that matches no
//!    parameter binds a field of the single entity-typed parameter, so
//!    `?email_address` with `user: &User` reads `user.email_address`.
//! 2. Positional markers bind, in order, the declared parameters not consumed
//!    by the first pass.
//!
//! Every marker occurrence becomes one placeholder and one binding.

use std::fmt;

use crate::{
    declaration::MethodDecl,
    descriptor::{BindTarget, ParameterBinding},
    dialect::Dialect,
    error::{Result, Site},
    mapping::TableMapping,
    types::{entity_ref, is_entity_sequence}
};

/// A bind marker as written in a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `?name`.
    Named(String),

    /// Bare `?`, numbered from 1 among positional markers.
    Positional(usize)
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "?{name}"),
            Self::Positional(ordinal) => write!(f, "? (positional #{ordinal})")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Sql(String),
    Marker(usize)
}

/// A scanned template with field names already translated to columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source:    String,
    segments:  Vec<Segment>,
    markers:   Vec<Marker>,
    words:     Vec<String>,
    top_level: Vec<String>
}

impl Template {
    /// Scan template text against the owner entity's mapping.
    #[must_use]
    pub fn parse(text: &str, mapping: &TableMapping) -> Self {
        let source = text.trim();
        let chars: Vec<char> = source.chars().collect();
        let mut template = Self {
            source:    source.to_owned(),
            segments:  Vec::new(),
            markers:   Vec::new(),
            words:     Vec::new(),
            top_level: Vec::new()
        };
        let mut sql = String::new();
        let mut positional = 0;
        let mut depth = 0usize;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            match c {
                '\'' | '"' | '`' => {
                    let end = chars[i + 1..]
                        .iter()
                        .position(|&ch| ch == c)
                        .map_or(chars.len(), |offset| i + offset + 2);
                    sql.extend(&chars[i..end]);
                    i = end;
                }
                '-' if next == Some('-') => {
                    let end = chars[i..]
                        .iter()
                        .position(|&ch| ch == '\n')
                        .map_or(chars.len(), |offset| i + offset);
                    sql.extend(&chars[i..end]);
                    i = end;
                }
                '/' if next == Some('*') => {
                    let end = chars[i + 2..]
                        .windows(2)
                        .position(|pair| pair == ['*', '/'])
                        .map_or(chars.len(), |offset| i + offset + 4);
                    sql.extend(&chars[i..end]);
                    i = end;
                }
                '(' | ')' => {
                    depth = if c == '(' {
                        depth + 1
                    } else {
                        depth.saturating_sub(1)
                    };
                    sql.push(c);
                    i += 1;
                }
                '?' if next == Some('?') => {
                    sql.push('?');
                    i += 2;
                }
                '?' => {
                    if !sql.is_empty() {
                        template.segments.push(Segment::Sql(std::mem::take(&mut sql)));
                    }
                    let marker = if next.is_some_and(is_word_start) {
                        let end = word_end(&chars, i + 1);
                        let name: String = chars[i + 1..end].iter().collect();
                        i = end;
                        Marker::Named(name)
                    } else {
                        positional += 1;
                        i += 1;
                        Marker::Positional(positional)
                    };
                    template
                        .segments
                        .push(Segment::Marker(template.markers.len()));
                    template.markers.push(marker);
                }
                c if is_word_start(c) => {
                    let end = word_end(&chars, i);
                    let word: String = chars[i..end].iter().collect();
                    let after_cast = i >= 2 && chars[i - 2..i] == [':', ':'];
                    match mapping.column_of(&word) {
                        Some(column) if !after_cast => sql.push_str(column),
                        _ => sql.push_str(&word)
                    }
                    if depth == 0 {
                        template.top_level.push(word.clone());
                    }
                    template.words.push(word);
                    i = end;
                }
                c if c.is_ascii_digit() => {
                    let end = word_end(&chars, i);
                    sql.extend(&chars[i..end]);
                    i = end;
                }
                c => {
                    sql.push(c);
                    i += 1;
                }
            }
        }
        if !sql.is_empty() {
            template.segments.push(Segment::Sql(sql));
        }
        template
    }

    /// Template text as written, trimmed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check if the template has no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Bind markers in order of occurrence.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Check if the first word is `keyword`, ignoring case.
    #[must_use]
    pub fn starts_with_keyword(&self, keyword: &str) -> bool {
        self.words
            .first()
            .is_some_and(|word| word.eq_ignore_ascii_case(keyword))
    }

    /// Check if an unquoted word outside parentheses is `keyword`, ignoring
    /// case.
    ///
    /// A `WHERE` inside a subquery does not restrict the statement itself.
    #[must_use]
    pub fn has_top_level_keyword(&self, keyword: &str) -> bool {
        self.top_level
            .iter()
            .any(|word| word.eq_ignore_ascii_case(keyword))
    }

    /// Unquoted words as written, before column translation.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Unquoted words outside parentheses.
    #[must_use]
    pub fn top_level_words(&self) -> &[String] {
        &self.top_level
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn word_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|&c| !(c.is_alphanumeric() || c == '_'))
        .map_or(chars.len(), |offset| start + offset)
}

/// Resolve every marker of `template` to a method parameter.
///
/// Returns one binding per marker, in marker order.
///
/// # Errors
///
/// - [`Error::UnresolvedPlaceholder`](crate::Error::UnresolvedPlaceholder)
///   when a marker matches nothing.
/// - [`Error::Signature`](crate::Error::Signature) when a marker would bind a
///   whole entity or a sequence of entities.
pub(crate) fn resolve(
    template: &Template,
    method: &MethodDecl,
    mapping: &TableMapping,
    site: Site<'_>
) -> Result<Vec<ParameterBinding>> {
    let entity_params: Vec<usize> = method
        .params
        .iter()
        .enumerate()
        .filter(|(_, param)| entity_ref(&param.ty, mapping).is_some())
        .map(|(index, _)| index)
        .collect();
    let bindable = |index: usize| -> Result<()> {
        let param = &method.params[index];
        if entity_ref(&param.ty, mapping).is_some() || is_entity_sequence(&param.ty, mapping) {
            return Err(site.signature(format!(
                "parameter `{}` is an entity and cannot be bound to a marker; bind its fields with `?field`",
                param.name
            )));
        }
        Ok(())
    };

    let mut consumed = vec![false; method.params.len()];
    let mut targets: Vec<Option<BindTarget>> = vec![None; template.markers.len()];

    for (slot, marker) in template.markers.iter().enumerate() {
        let Marker::Named(name) = marker else {
            continue;
        };
        let target = if let Some(index) = method.param_index(name) {
            bindable(index)?;
            consumed[index] = true;
            BindTarget::Param {
                index
            }
        } else if let [param] = entity_params[..]
            && mapping.has_field(name)
        {
            consumed[param] = true;
            BindTarget::Field {
                param,
                field: name.clone()
            }
        } else {
            return Err(site.unresolved(marker.to_string()));
        };
        targets[slot] = Some(target);
    }

    let mut next = 0;
    for (slot, marker) in template.markers.iter().enumerate() {
        if !matches!(marker, Marker::Positional(_)) {
            continue;
        }
        while next < consumed.len() && consumed[next] {
            next += 1;
        }
        if next == consumed.len() {
            return Err(site.unresolved(marker.to_string()));
        }
        bindable(next)?;
        consumed[next] = true;
        targets[slot] = Some(BindTarget::Param {
            index: next
        });
    }

    Ok(template
        .markers
        .iter()
        .zip(targets)
        .filter_map(|(marker, target)| {
            target.map(|target| ParameterBinding {
                marker: Some(marker.clone()),
                target
            })
        })
        .collect())
}

/// Incremental SQL text writer numbering placeholders as it goes.
///
/// Mirrors `sqlx::QueryBuilder`: plain text with [`push`](Self::push), values
/// with [`push_bind`](Self::push_bind).
#[derive(Debug)]
pub(crate) struct SqlWriter {
    dialect:  Dialect,
    sql:      String,
    bindings: Vec<ParameterBinding>
}

impl SqlWriter {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            bindings: Vec::new()
        }
    }

    pub(crate) fn push(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    pub(crate) fn push_bind(&mut self, binding: ParameterBinding) -> &mut Self {
        self.bindings.push(binding);
        let placeholder = self.dialect.placeholder(self.bindings.len());
        self.sql.push_str(&placeholder);
        self
    }

    /// Write a template, binding its markers with `bindings` in order.
    pub(crate) fn push_template(
        &mut self,
        template: &Template,
        bindings: &[ParameterBinding]
    ) -> &mut Self {
        for segment in &template.segments {
            match segment {
                Segment::Sql(text) => {
                    self.push(text);
                }
                Segment::Marker(slot) => {
                    if let Some(binding) = bindings.get(*slot) {
                        self.push_bind(binding.clone());
                    }
                }
            }
        }
        self
    }

    pub(crate) fn finish(self) -> (String, Vec<ParameterBinding>) {
        (self.sql, self.bindings)
    }
}
