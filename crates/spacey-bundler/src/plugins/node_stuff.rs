// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js environment substitution.
//!
//! Rewrites the Node-specific free variables of a module at build time so
//! the bundle runs without a Node runtime module system:
//!
//! | expression | result |
//! |---|---|
//! | `__filename`, `__dirname` | bound per [`NodeStuffOptions`] |
//! | `require.main` | `__spacey_require__.c[0]` |
//! | `require.extensions` | `(void 0)` plus a warning |
//! | `module.exports`, `module.loaded`, `module.id` | kept |
//! | `module` | bound to the `module` adapter shim |
//! | `module.hot` | evaluates to `false` |

use crate::compiler::{BuildContext, Compiler, Plugin};
use crate::dependency::{ConstTemplate, DependencyKind, NullFactory};
use crate::literal::LiteralValue;
use crate::module::Module;
use crate::options::{DirnameOption, FilenameOption, NodeStuffOptions};
use crate::parser::{EvaluatedExpression, Flow, Recognizer};
use crate::path;
use tracing::debug;

/// `__filename` under the `mock` option
pub const MOCK_FILENAME: &str = "/index.js";

/// `__dirname` under the `mock` option
pub const MOCK_DIRNAME: &str = "/";

/// Runtime reference to the entry module
pub const REQUIRE_MAIN: &str = "__spacey_require__.c[0]";

/// Neutral value substituted for unsupported expressions
pub const NEUTRAL: &str = "(void 0)";

/// Warning raised for every `require.extensions`
pub const REQUIRE_EXTENSIONS_WARNING: &str =
    "require.extensions is not supported by spacey. Use a loader instead.";

/// Substitutes Node.js environment values in every module.
#[derive(Debug, Clone, Default)]
pub struct NodeStuffPlugin {
    options: NodeStuffOptions,
}

impl NodeStuffPlugin {
    /// Create the plugin
    pub fn new(options: NodeStuffOptions) -> Self {
        Self { options }
    }

    /// The options the plugin was created with
    pub fn options(&self) -> &NodeStuffOptions {
        &self.options
    }

    fn register_filename(&self, hooks: &mut Recognizer) {
        match self.options.filename {
            FilenameOption::Mock => hooks.set_constant("__filename", MOCK_FILENAME),
            FilenameOption::Relative => hooks.set_module_constant("__filename", |build, module| {
                Some(path::relative(build.root(), module.resource_path()).into())
            }),
            FilenameOption::Off => {}
        }

        hooks.on_evaluate_identifier("__filename", |state, expr| {
            let module = state.module()?;
            Some(EvaluatedExpression::string(module.resource_path(), expr.span))
        });
    }

    fn register_dirname(&self, hooks: &mut Recognizer) {
        match self.options.dirname {
            DirnameOption::Mock => hooks.set_constant("__dirname", MOCK_DIRNAME),
            DirnameOption::MockAbsolute => hooks.set_module_expression("__dirname", absolute_dirname),
            DirnameOption::Relative => hooks.set_module_constant("__dirname", |build, module| {
                let context = module.context()?;
                Some(LiteralValue::from(path::relative(build.root(), context)))
            }),
            DirnameOption::Off => {}
        }

        hooks.on_evaluate_identifier("__dirname", |state, expr| {
            let context = state.module()?.context()?;
            Some(EvaluatedExpression::string(context, expr.span))
        });
    }

    /// `require.main` and `require.extensions` are rewritten only while a
    /// module is being built. Without one both hooks decline, so no
    /// `(void 0)` replacement and no warning are recorded.
    fn register_require(&self, hooks: &mut Recognizer) {
        hooks.on_expression("require.main", |state, expr| {
            state.emit_replacement(REQUIRE_MAIN, expr.span, Some(expr.loc))
        });

        hooks.on_expression("require.extensions", |state, expr| {
            let flow = state.emit_replacement(NEUTRAL, expr.span, Some(expr.loc))?;
            if flow.is_handled() {
                state.warn_unsupported(REQUIRE_EXTENSIONS_WARNING, Some(expr.loc));
            }
            Ok(flow)
        });
    }

    fn register_module(&self, hooks: &mut Recognizer) {
        for kept in ["module.exports", "module.loaded", "module.id"] {
            hooks.on_expression(kept, |_, _| Ok(Flow::Handled));
        }

        hooks.on_evaluate_identifier("module.hot", |_, expr| {
            Some(EvaluatedExpression::boolean(false, expr.span))
        });

        hooks.set_module_expression("module", |build, module| {
            let request = shim_request(build.module_shim(), module.context());
            Some(format!(
                "require({})(module)",
                LiteralValue::from(request).to_source()
            ))
        });
    }
}

impl Plugin for NodeStuffPlugin {
    fn apply(&self, compiler: &mut Compiler) {
        debug!(
            "Applying node environment plugin: __filename={:?} __dirname={:?}",
            self.options.filename, self.options.dirname
        );

        let compilation = compiler.compilation_mut();
        compilation.set_dependency_factory(DependencyKind::Const, NullFactory);
        compilation.set_dependency_template(DependencyKind::Const, ConstTemplate);

        let hooks = compiler.hooks_mut();
        self.register_filename(hooks);
        self.register_dirname(hooks);
        self.register_require(hooks);
        self.register_module(hooks);
    }
}

/// `require("path").join(__dirname, "<context relative to root>")`.
///
/// Declines when the module has no context or lives on another drive than
/// the build root.
fn absolute_dirname(build: &BuildContext, module: &Module) -> Option<String> {
    let context = module.context()?;
    let relative = path::relative(build.root(), context);
    if path::is_absolute(&relative) {
        debug!(
            "{} is not below build root {}; __dirname left as is",
            context,
            build.root()
        );
        return None;
    }
    Some(format!(
        "require(\"path\").join(__dirname, {})",
        LiteralValue::from(relative).to_source()
    ))
}

/// Request for the adapter shim as seen from `context`.
///
/// Relative requests always start with `./`; a shim on another drive stays
/// absolute.
pub fn shim_request(shim: &str, context: Option<&str>) -> String {
    let Some(context) = context else {
        return path::to_slash(shim);
    };
    let relative = path::relative(context, shim);
    if path::is_drive_absolute(&relative) {
        relative
    } else {
        format!("./{}", relative)
    }
}
