// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compilation units

use crate::dependency::Dependency;
use crate::diagnostics::Warning;
use crate::error::{BundleError, Result};
use crate::path;
use std::collections::BTreeMap;

/// Split a resource into its path and `?query` parts.
pub fn split_query(resource: &str) -> (&str, Option<&str>) {
    match resource.find('?') {
        Some(index) => (&resource[..index], Some(&resource[index..])),
        None => (resource, None),
    }
}

/// A module being bundled, identified by its resolved resource.
#[derive(Debug, Clone)]
pub struct Module {
    /// Absolute resource path, possibly followed by a query
    resource: String,
    /// Directory the module lives in
    context: Option<String>,
    /// Source range replacements, in registration order
    dependencies: Vec<Dependency>,
    /// Bindings injected around the module body
    variables: BTreeMap<String, String>,
    /// Advisory warnings, in the order they were raised
    warnings: Vec<Warning>,
}

impl Module {
    /// Create a module for a resolved resource. The context is the
    /// directory of the resource path.
    pub fn new(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        let context = Some(path::dirname(split_query(&resource).0));
        Self {
            resource,
            context,
            dependencies: Vec::new(),
            variables: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Override the module context
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    /// Module identifier used in diagnostics
    pub fn identifier(&self) -> &str {
        &self.resource
    }

    /// The full resource, including any query
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The resource without its query
    pub fn resource_path(&self) -> &str {
        split_query(&self.resource).0
    }

    /// The directory the module lives in
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Replacements registered while parsing
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Bindings committed by the last successful parse
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Warnings raised while building
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Register a replacement. A range may be claimed only once.
    pub fn add_dependency(&mut self, dependency: Dependency) -> Result<()> {
        if let Some(existing) = self
            .dependencies
            .iter()
            .find(|existing| existing.span.overlaps(&dependency.span) || existing.span == dependency.span)
        {
            return Err(BundleError::RangeConflict {
                module: self.resource.clone(),
                first: existing.span,
                second: dependency.span,
            });
        }
        self.dependencies.push(dependency);
        Ok(())
    }

    /// Append a warning
    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub(crate) fn commit_variables(&mut self, variables: BTreeMap<String, String>) {
        self.variables = variables;
    }

    /// Drop the output of a failed build. Warnings stay.
    pub(crate) fn discard_build_output(&mut self) {
        self.dependencies.clear();
        self.variables.clear();
    }

    /// Drop everything a previous build attached to the module.
    pub(crate) fn reset_build_state(&mut self) {
        self.dependencies.clear();
        self.variables.clear();
        self.warnings.clear();
    }
}
