// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Binding free names to values computed at build time

use crate::compiler::BuildContext;
use crate::literal::LiteralValue;
use crate::module::Module;
use crate::parser::hooks::{Flow, Recognizer};

impl Recognizer {
    /// Bind `name` to the same literal in every module.
    pub fn set_constant(&mut self, name: &str, value: impl Into<LiteralValue>) {
        let source = value.into().to_source();
        self.set_module_expression(name, move |_, _| Some(source.clone()));
    }

    /// Bind `name` to a literal computed per module. Declines when `value`
    /// produces nothing.
    pub fn set_module_constant<F>(&mut self, name: &str, value: F)
    where
        F: Fn(&BuildContext, &Module) -> Option<LiteralValue> + Send + Sync + 'static,
    {
        self.set_module_expression(name, move |build, module| {
            value(build, module).map(|literal| literal.to_source())
        });
    }

    /// Bind `name` to raw expression source computed per module.
    pub fn set_module_expression<F>(&mut self, name: &str, value: F)
    where
        F: Fn(&BuildContext, &Module) -> Option<String> + Send + Sync + 'static,
    {
        let bound = name.to_string();
        self.on_expression(name, move |state, _| {
            let Some(module) = state.module() else {
                return Ok(Flow::Declined);
            };
            let Some(expression) = value(state.build(), module) else {
                return Ok(Flow::Declined);
            };
            state.add_variable(bound.as_str(), expression);
            Ok(Flow::Handled)
        });
    }
}
