// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The compiler: plugin registration, module builds and code generation.
//!
//! A [`Compiler`] is configured once (build root, plugins) and then shared
//! read-only by every module build. Builds of different modules are
//! independent and may run in parallel; see [`Compiler::build_modules`].

use crate::dependency::{DependencyKind, DependencyTemplate, ModuleFactory, ReplaceSource};
use crate::error::{BundleError, Result};
use crate::module::Module;
use crate::parser::{EvaluatedExpression, JavascriptParser, ParseState, Recognizer};
use crate::path;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Adapter shim bound to `module`, shipped with this crate.
pub const DEFAULT_MODULE_SHIM: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/buildin/module.js");

/// Build-wide settings every hook can read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    root: String,
    module_shim: String,
}

impl BuildContext {
    /// Settings for a build rooted at `root`.
    pub fn new(root: impl AsRef<str>) -> Self {
        Self {
            root: path::normalize(root.as_ref()),
            module_shim: path::normalize(DEFAULT_MODULE_SHIM),
        }
    }

    /// Use another adapter shim for `module`.
    pub fn with_module_shim(mut self, shim: impl AsRef<str>) -> Self {
        self.module_shim = path::normalize(shim.as_ref());
        self
    }

    /// The build root all reported paths are relative to
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Absolute path of the `module` adapter shim
    pub fn module_shim(&self) -> &str {
        &self.module_shim
    }
}

/// Something that configures a compiler.
pub trait Plugin {
    /// Register hooks, factories and templates on `compiler`.
    fn apply(&self, compiler: &mut Compiler);
}

/// Factories and templates per dependency kind.
#[derive(Default)]
pub struct Compilation {
    factories: HashMap<DependencyKind, Box<dyn ModuleFactory>>,
    templates: HashMap<DependencyKind, Box<dyn DependencyTemplate>>,
}

impl Compilation {
    /// Register the factory resolving `kind` dependencies.
    pub fn set_dependency_factory(
        &mut self,
        kind: DependencyKind,
        factory: impl ModuleFactory + 'static,
    ) {
        self.factories.insert(kind, Box::new(factory));
    }

    /// Register the template rendering `kind` dependencies.
    pub fn set_dependency_template(
        &mut self,
        kind: DependencyKind,
        template: impl DependencyTemplate + 'static,
    ) {
        self.templates.insert(kind, Box::new(template));
    }

    /// Resolve the dependencies of a parsed module.
    fn resolve_dependencies(&self, module: &Module) -> Result<()> {
        for dependency in module.dependencies() {
            let factory = self
                .factories
                .get(&dependency.kind)
                .ok_or(BundleError::MissingFactory(dependency.kind))?;
            if let Some(target) = factory.create(dependency)? {
                debug!(
                    "{} at {} refers to {}",
                    module.identifier(),
                    dependency.span,
                    target.identifier()
                );
            }
        }
        Ok(())
    }

    /// Generate the final source of a built module.
    ///
    /// Every dependency is applied through the template of its kind, then
    /// the committed bindings are injected around the body:
    ///
    /// ```text
    /// (function(__dirname, module) {
    /// <source>
    /// }.call(this, "src", require("./../buildin/module.js")(module)))
    /// ```
    ///
    /// A leading `#!` line stays above the wrapper.
    pub fn render_module(&self, module: &Module, source: &str) -> Result<String> {
        let mut replaced = ReplaceSource::new(source);
        for dependency in module.dependencies() {
            let template = self
                .templates
                .get(&dependency.kind)
                .ok_or(BundleError::MissingTemplate(dependency.kind))?;
            template.apply(dependency, &mut replaced);
        }
        let body = replaced.render();

        let variables = module.variables();
        if variables.is_empty() {
            return Ok(body);
        }
        let (hashbang, body) = split_hashbang(&body);
        let names: Vec<&str> = variables.keys().map(String::as_str).collect();
        let values: Vec<&str> = variables.values().map(String::as_str).collect();
        Ok(format!(
            "{}(function({}) {{\n{}\n}}.call(this, {}))",
            hashbang,
            names.join(", "),
            body,
            values.join(", ")
        ))
    }
}

/// Splits `source` into its `#!` line, newline included, and the rest.
fn split_hashbang(source: &str) -> (&str, &str) {
    if !source.starts_with("#!") {
        return ("", source);
    }
    match source.find('\n') {
        Some(end) => source.split_at(end + 1),
        None => (source, ""),
    }
}

impl std::fmt::Debug for Compilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut factories: Vec<_> = self.factories.keys().collect();
        factories.sort();
        let mut templates: Vec<_> = self.templates.keys().collect();
        templates.sort();
        f.debug_struct("Compilation")
            .field("factories", &factories)
            .field("templates", &templates)
            .finish()
    }
}

/// Configured compiler shared by all module builds.
#[derive(Debug)]
pub struct Compiler {
    build: BuildContext,
    parser: JavascriptParser,
    compilation: Compilation,
}

impl Compiler {
    /// A compiler for the build rooted at `root`, without plugins.
    pub fn new(root: impl AsRef<str>) -> Self {
        Self::with_context(BuildContext::new(root))
    }

    /// A compiler with explicit build settings.
    pub fn with_context(build: BuildContext) -> Self {
        Self {
            build,
            parser: JavascriptParser::new(),
            compilation: Compilation::default(),
        }
    }

    /// Build-wide settings
    pub fn build_context(&self) -> &BuildContext {
        &self.build
    }

    /// Apply a plugin.
    pub fn apply(&mut self, plugin: &dyn Plugin) {
        plugin.apply(self);
    }

    /// The module parser
    pub fn parser(&self) -> &JavascriptParser {
        &self.parser
    }

    /// Parser hooks, for plugins
    pub fn hooks_mut(&mut self) -> &mut Recognizer {
        self.parser.hooks_mut()
    }

    /// Factories and templates
    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    /// Factories and templates, for plugins
    pub fn compilation_mut(&mut self) -> &mut Compilation {
        &mut self.compilation
    }

    /// Parse `source` as the content of `module`.
    ///
    /// Any output of a previous build is dropped first. On error the module
    /// keeps no dependencies or bindings.
    #[instrument(skip_all, fields(module = %module.identifier()))]
    pub fn build_module(&self, module: &mut Module, source: &str) -> Result<()> {
        module.reset_build_state();

        let parsed = {
            let mut state = ParseState::new(&self.build, Some(&mut *module));
            self.parser
                .parse(source, &mut state)
                .map(|()| state.finish())
        };
        let result = parsed.and_then(|()| self.compilation.resolve_dependencies(module));

        match &result {
            Ok(()) => debug!(
                "Built {} with {} dependencies and {} bindings",
                module.identifier(),
                module.dependencies().len(),
                module.variables().len()
            ),
            Err(err) => {
                warn!("Failed to build {}: {}", module.identifier(), err);
                module.discard_build_output();
            }
        }
        result
    }

    /// Build several modules in parallel. Results are in input order; a
    /// failing module does not affect the others.
    pub fn build_modules(&self, modules: &mut [(Module, String)]) -> Vec<Result<()>> {
        use rayon::prelude::*;

        modules
            .par_iter_mut()
            .map(|(module, source)| self.build_module(module, source))
            .collect()
    }

    /// Generate the final source of a built module.
    pub fn render_module(&self, module: &Module, source: &str) -> Result<String> {
        self.compilation.render_module(module, source)
    }

    /// Statically evaluate every free expression of `source` as if it were
    /// the content of `module`. Nothing is recorded on the module.
    pub fn evaluate(
        &self,
        module: Option<&Module>,
        source: &str,
    ) -> Result<Vec<EvaluatedExpression>> {
        let mut scratch = module.cloned();
        let mut state = ParseState::new(&self.build, scratch.as_mut());
        self.parser.evaluate_source(source, &mut state)
    }
}
