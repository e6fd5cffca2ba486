// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-bundler
//!
//! Build-time substitution of the Node.js environment for the Spacey bundler.
//!
//! Modules written for Node refer to `__filename`, `__dirname`, `require.main`
//! and `module`. This crate rewrites those references while a module is
//! built so that the bundled code runs without Node's module system:
//!
//! - A pattern-keyed hook registry the JavaScript parser dispatches to
//! - Constant bindings injected around the module body
//! - Source-range replacements rendered through dependency templates
//! - Static evaluation of `__filename`, `__dirname` and `module.hot`
//! - Advisory warnings for constructs that cannot be supported
//!
//! ## Quick Start
//!
//! ```rust
//! use spacey_bundler::{Compiler, Module, NodeStuffOptions, NodeStuffPlugin};
//!
//! let options = NodeStuffOptions::from_json_str(r#"{"__dirname": true}"#).unwrap();
//! let mut compiler = Compiler::new("/project");
//! compiler.apply(&NodeStuffPlugin::new(options));
//!
//! let source = "if (require.main === module) start(__dirname);";
//! let mut module = Module::new("/project/src/cli.js");
//! compiler.build_module(&mut module, source).unwrap();
//!
//! let output = compiler.render_module(&module, source).unwrap();
//! assert!(output.starts_with("(function(__dirname, module) {\n"));
//! assert!(output.contains("if (__spacey_require__.c[0] === module) start(__dirname);"));
//! assert!(output.contains("}.call(this, \"src\", require(\"./"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod dependency;
pub mod diagnostics;
pub mod error;
pub mod literal;
pub mod module;
pub mod options;
pub mod parser;
pub mod path;
pub mod plugins;

// Re-exports for convenience
pub use compiler::{BuildContext, Compilation, Compiler, Plugin};
pub use dependency::{Dependency, DependencyKind};
pub use diagnostics::{Warning, WarningKind};
pub use error::{BundleError, Result};
pub use literal::LiteralValue;
pub use module::Module;
pub use options::{DirnameOption, FilenameOption, NodeStuffOptions};
pub use parser::{EvaluatedExpression, EvaluatedValue};
pub use plugins::NodeStuffPlugin;

/// Version of the bundler
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
