// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error taxonomy for a generation run.
//!
//! Every variant names the entity, repository and method it concerns so a
//! failure can be acted on straight from the message.
//!
//! # Propagation
//!
//! | Phase | Variants | Effect |
//! |-------|----------|--------|
//! | Entity collection | `Configuration`, `DuplicateEntity` | Aborts the run |
//! | Statement building | `UnknownEntity`, `UnresolvedPlaceholder`, `Signature` | Skips one repository |
//! | Emission | `Emission`, `Io` | Skips one repository |
//! | Front end | `Source`, `Io` | Raised before a run starts |

use std::{io, path::PathBuf};

/// Result alias used across the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while mapping entities and generating repositories.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed entity declaration.
    #[error("entity `{entity}`: {reason}")]
    Configuration {
        /// Qualified entity name.
        entity: String,
        /// What is wrong with the declaration.
        reason: String
    },

    /// The same entity was declared twice.
    #[error("entity `{entity}` is declared more than once")]
    DuplicateEntity {
        /// Qualified entity name.
        entity: String
    },

    /// A repository refers to an entity that was never declared as a table.
    #[error("repository `{repository}`: model `{entity}` is not declared with #[table]")]
    UnknownEntity {
        /// Qualified repository name.
        repository: String,
        /// Entity reference as resolved from the repository.
        entity:     String
    },

    /// A bind marker matches no method parameter.
    #[error("{repository}::{method}: bind marker `{marker}` matches no parameter")]
    UnresolvedPlaceholder {
        /// Qualified repository name.
        repository: String,
        /// Method name.
        method:     String,
        /// The marker as written (`?name` or `?`).
        marker:     String
    },

    /// The method signature does not fit its statement kind.
    #[error("{repository}::{method}: {reason}")]
    Signature {
        /// Qualified repository name.
        repository: String,
        /// Method name.
        method:     String,
        /// What the statement kind expected.
        reason:     String
    },

    /// Internal inconsistency while assembling generated code.
    #[error("repository `{repository}`: {reason}")]
    Emission {
        /// Qualified repository name.
        repository: String,
        /// What could not be assembled.
        reason:     String
    },

    /// A declaration file could not be parsed.
    #[error("failed to parse `{}`: {reason}", path.display())]
    Source {
        /// Source file.
        path:   PathBuf,
        /// Parser message.
        reason: String
    },

    /// Reading a declaration file or writing a generated unit failed.
    #[error("i/o error on `{}`: {source}", path.display())]
    Io {
        /// File being read or written.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error
    }
}

impl Error {
    /// Whether this error must abort the whole run.
    ///
    /// Entity metadata errors leave the registry inconsistent, so nothing
    /// may be generated from it.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::DuplicateEntity { .. })
    }

    pub(crate) fn configuration(entity: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            entity: entity.to_owned(),
            reason: reason.into()
        }
    }
}

/// Repository method an error is reported against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site<'a> {
    pub repository: &'a str,
    pub method:     &'a str
}

impl Site<'_> {
    pub(crate) fn signature(&self, reason: impl Into<String>) -> Error {
        Error::Signature {
            repository: self.repository.to_owned(),
            method:     self.method.to_owned(),
            reason:     reason.into()
        }
    }

    pub(crate) fn unresolved(&self, marker: impl Into<String>) -> Error {
        Error::UnresolvedPlaceholder {
            repository: self.repository.to_owned(),
            method:     self.method.to_owned(),
            marker:     marker.into()
        }
    }
}
