// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Declared names of the module being parsed.
//!
//! A free name declared by the module itself (`var module`, a parameter named
//! `require`, ...) shadows the environment value of the same name and must
//! not be rewritten while its declaring block is open. `var` names are
//! hoisted to the innermost function body.

/// A name declared in a block.
#[derive(Debug, Clone)]
pub struct Local {
    /// The variable name
    pub name: String,
    /// The scope depth where this was declared
    pub depth: usize,
}

/// Nested block scopes.
#[derive(Debug, Default)]
pub struct Scope {
    /// Local variables in this scope
    pub locals: Vec<Local>,
    /// Current scope depth (0 = module)
    pub depth: usize,
    /// Depths of the open function bodies, innermost last
    function_depths: Vec<usize>,
}

impl Scope {
    /// Creates a new scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new scope.
    pub fn begin_scope(&mut self) {
        self.depth += 1;
    }

    /// Begin the body scope of a function.
    pub fn begin_function_scope(&mut self) {
        self.begin_scope();
        self.function_depths.push(self.depth);
    }

    /// End the current scope and return the number of locals dropped.
    pub fn end_scope(&mut self) -> usize {
        let before = self.locals.len();
        let depth = self.depth;
        self.locals.retain(|local| local.depth < depth);
        if self.function_depths.last() == Some(&depth) {
            self.function_depths.pop();
        }
        self.depth = self.depth.saturating_sub(1);
        before - self.locals.len()
    }

    /// Declare a name in the current scope. Redeclaration is allowed.
    pub fn declare(&mut self, name: impl Into<String>) {
        self.locals.push(Local {
            name: name.into(),
            depth: self.depth,
        });
    }

    /// Declare a `var` name in the innermost function body, or the module.
    pub fn declare_var(&mut self, name: impl Into<String>) {
        let depth = self.function_depths.last().copied().unwrap_or(0);
        self.locals.push(Local {
            name: name.into(),
            depth,
        });
    }

    /// Resolve a local variable by name, returning its index.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.locals.iter().rposition(|local| local.name == name)
    }

    /// Check if a variable is a local (vs free).
    pub fn is_local(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}
