// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Generation driver.
//!
//! A run has two strictly ordered phases:
//!
//! 1. **Collect entities.** Every entity declaration is mapped and
//!    registered. Any error aborts the run.
//! 2. **Generate repositories.** Over the frozen registry, each repository
//!    resolves its model, builds descriptors and is emitted. Errors are
//!    scoped to one repository: recorded in [`RunReport::failures`], its
//!    output skipped, the run continues.
//!
//! A run without entities logs a warning and generates nothing.

use convert_case::{Case, Casing};

use crate::{
    config::GeneratorConfig,
    declaration::{DeclarationSource, RepositoryDecl},
    descriptor::DescriptorBuilder,
    emit::{self, Emitter, GeneratedUnit},
    error::{Error, Result},
    mapping::{TableMapping, map_entity},
    registry::MappingRegistry
};

/// Outcome of a run that got past entity collection.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of registered entities.
    pub entities: usize,

    /// Repositories emitted, in declaration order.
    pub emitted: Vec<String>,

    /// Repository-scoped failures, in declaration order.
    pub failures: Vec<Error>
}

impl RunReport {
    /// Check if every repository was emitted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives one generation run.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig
}

impl Generator {
    /// Create a generator with the given configuration.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config
        }
    }

    /// Configuration of this generator.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Map and register every entity of `source`.
    ///
    /// # Errors
    ///
    /// The first [`Error::Configuration`] or [`Error::DuplicateEntity`].
    pub fn collect_entities(&self, source: &impl DeclarationSource) -> Result<MappingRegistry> {
        let mut registry = MappingRegistry::new();
        for decl in source.entities() {
            registry.register(map_entity(decl)?)?;
        }
        Ok(registry)
    }

    /// Generate the unit of one repository against a frozen registry.
    ///
    /// # Errors
    ///
    /// Any repository-scoped error: [`Error::UnknownEntity`],
    /// [`Error::UnresolvedPlaceholder`], [`Error::Signature`] or
    /// [`Error::Emission`].
    pub fn generate_repository(
        &self,
        repository: &RepositoryDecl,
        registry: &MappingRegistry
    ) -> Result<GeneratedUnit> {
        let owner = resolve_model(repository, registry)?;
        let descriptors = DescriptorBuilder::new(owner, &repository.qualified_name, &self.config)
            .build_all(&repository.methods)?;
        emit::emit(
            &repository.qualified_name,
            &output_file_name(repository),
            &descriptors,
            owner,
            self.config.dialect
        )
    }

    /// Run both phases and hand every unit to `emitter`.
    ///
    /// # Errors
    ///
    /// Entity collection errors. Repository errors are reported in the
    /// returned [`RunReport`] instead.
    pub fn run(
        &self,
        source: &impl DeclarationSource,
        emitter: &mut impl Emitter
    ) -> Result<RunReport> {
        let registry = self.collect_entities(source)?;
        let mut report = RunReport {
            entities: registry.len(),
            ..RunReport::default()
        };
        if registry.is_empty() {
            tracing::warn!("no #[table] entities declared, nothing to generate");
            return Ok(report);
        }

        for repository in source.repositories() {
            let outcome = self
                .generate_repository(repository, &registry)
                .and_then(|unit| emitter.emit(&unit));
            match outcome {
                Ok(()) => report.emitted.push(repository.qualified_name.clone()),
                Err(err) => {
                    tracing::error!(
                        repository = %repository.qualified_name,
                        error = %err,
                        "repository skipped"
                    );
                    report.failures.push(err);
                }
            }
        }
        Ok(report)
    }
}

/// Output file name: the declared one, or the snake_case trait name, with
/// `.rs` appended when missing.
#[must_use]
pub fn output_file_name(repository: &RepositoryDecl) -> String {
    let name = repository
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| repository.simple_name().to_case(Case::Snake), str::to_owned);
    if name.ends_with(".rs") {
        name
    } else {
        format!("{name}.rs")
    }
}

/// Resolve the model reference of a repository to its registered mapping.
///
/// `crate::`, `self::` and `super::` are resolved against the repository's
/// module. Other paths are tried relative to that module first and then as
/// written. A single name that matches nothing falls back to the only
/// registered entity with that name, which covers `use`-imported models.
///
/// # Errors
///
/// [`Error::UnknownEntity`] when nothing matches.
pub fn resolve_model<'r>(
    repository: &RepositoryDecl,
    registry: &'r MappingRegistry
) -> Result<&'r TableMapping> {
    let candidates = model_candidates(repository);
    if let Some(found) = candidates.iter().find_map(|name| registry.get(name)) {
        return Ok(found);
    }

    let model: String = repository.model.split_whitespace().collect();
    if !model.contains("::") {
        let mut named = registry.iter().filter(|m| m.simple_name() == model);
        if let (Some(only), None) = (named.next(), named.next()) {
            return Ok(only);
        }
    }

    let entity = candidates.into_iter().next().unwrap_or(model);
    registry.lookup(&entity, &repository.qualified_name)
}

fn model_candidates(repository: &RepositoryDecl) -> Vec<String> {
    let model: String = repository.model.split_whitespace().collect();
    let model = model.trim_start_matches("::");
    let module: Vec<&str> = repository
        .module_path()
        .split("::")
        .filter(|segment| !segment.is_empty())
        .collect();
    let rooted = module.first() == Some(&"crate");
    let join = |base: &[&str], rest: &str| {
        base.iter()
            .copied()
            .chain(std::iter::once(rest))
            .collect::<Vec<_>>()
            .join("::")
    };

    if let Some(rest) = model.strip_prefix("crate::") {
        let absolute = if rooted {
            format!("crate::{rest}")
        } else {
            rest.to_owned()
        };
        return vec![absolute];
    }
    if let Some(rest) = model.strip_prefix("self::") {
        return vec![join(&module, rest)];
    }
    if model.starts_with("super::") {
        let mut base = module;
        let mut rest = model;
        while let Some(stripped) = rest.strip_prefix("super::") {
            base.pop();
            rest = stripped;
        }
        return vec![join(&base, rest)];
    }

    let relative = join(&module, model);
    if relative == model {
        vec![relative]
    } else if rooted {
        vec![relative, format!("crate::{model}")]
    } else {
        vec![relative, model.to_owned()]
    }
}
