// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! spacey-pack - Node.js environment substitution for bundled modules
//!
//! Builds each given file as a module of the build rooted at `--context`,
//! rewriting `__filename`, `__dirname`, `require.main` and friends, and prints
//! the generated code or writes it below `--out-dir`.

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use spacey_bundler::compiler::BuildContext;
use spacey_bundler::{Compiler, Module, NodeStuffOptions, NodeStuffPlugin, VERSION, path};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "spacey-pack",
    about = "Substitute the Node.js environment in bundled modules",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Build root that reported paths are relative to
    #[arg(long, default_value = ".")]
    context: PathBuf,

    /// Options file (.json or .toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Substitution of `__filename`: false, true or mock
    #[arg(long, value_name = "VALUE")]
    filename: Option<String>,

    /// Substitution of `__dirname`: false, true, mock or mock_absolute
    #[arg(long, value_name = "VALUE")]
    dirname: Option<String>,

    /// Adapter shim bound to `module`
    #[arg(long)]
    module_shim: Option<PathBuf>,

    /// Write generated modules below this directory instead of stdout
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Module files to build
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "spacey_pack=debug,spacey_bundler=debug"
    } else {
        "spacey_pack=warn,spacey_bundler=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = load_options(&cli)?;
    debug!("Options: {:?}", options);

    let root = absolute(&cli.context)?;
    let mut build = BuildContext::new(&root);
    if let Some(shim) = &cli.module_shim {
        build = build.with_module_shim(absolute(shim)?);
    }
    let mut compiler = Compiler::with_context(build);
    compiler.apply(&NodeStuffPlugin::new(options));

    let mut modules = Vec::with_capacity(cli.files.len());
    for file in &cli.files {
        let resource = absolute(file)?;
        let source = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        modules.push((Module::new(resource), source));
    }

    let results = compiler.build_modules(&mut modules);

    let mut failed = 0;
    for ((module, source), result) in modules.iter().zip(results) {
        for warning in module.warnings() {
            eprintln!("{}: {}", "WARNING".yellow().bold(), warning.yellow());
        }

        let output = result.and_then(|()| compiler.render_module(module, source));
        match output {
            Ok(code) => emit(&cli, compiler.build_context().root(), module, &code)?,
            Err(err) => {
                failed += 1;
                eprintln!(
                    "{} in {}: {}",
                    "ERROR".red().bold(),
                    module.identifier().cyan(),
                    err
                );
            }
        }
    }

    if failed > 0 {
        eprintln!(
            "{}",
            format!("{} of {} modules failed", failed, modules.len())
                .red()
                .bold()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Options file first, then command-line overrides.
fn load_options(cli: &Cli) -> Result<NodeStuffOptions> {
    let mut options = match &cli.config {
        Some(config) => NodeStuffOptions::load(config)
            .with_context(|| format!("Failed to load options from {}", config.display()))?,
        None => NodeStuffOptions::default(),
    };
    if let Some(value) = &cli.filename {
        options.set("__filename", value)?;
    }
    if let Some(value) = &cli.dirname {
        options.set("__dirname", value)?;
    }
    Ok(options)
}

fn absolute(file: &Path) -> Result<String> {
    let absolute = std::path::absolute(file)
        .with_context(|| format!("Failed to resolve {}", file.display()))?;
    Ok(path::to_slash(&absolute.to_string_lossy()))
}

/// Print the generated module, or write it below `--out-dir`.
fn emit(cli: &Cli, root: &str, module: &Module, code: &str) -> Result<()> {
    let Some(out_dir) = &cli.out_dir else {
        println!("// {}", module.identifier());
        println!("{}", code);
        return Ok(());
    };
    let target = output_path(out_dir, root, module.resource_path());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&target, code).with_context(|| format!("Failed to write {}", target.display()))?;
    debug!("Wrote {}", target.display());
    Ok(())
}

/// Where a module lands below `out_dir`. Modules outside the build root keep
/// only their file name.
fn output_path(out_dir: &Path, root: &str, resource: &str) -> PathBuf {
    let relative = path::relative(root, resource);
    if relative.starts_with("..") || path::is_absolute(&relative) {
        let name = relative.rsplit('/').next().unwrap_or(&relative);
        return out_dir.join(name);
    }
    relative
        .split('/')
        .fold(out_dir.to_path_buf(), |target, part| target.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_below_root() {
        let out = Path::new("dist");
        assert_eq!(
            output_path(out, "/project", "/project/src/a.js"),
            Path::new("dist").join("src").join("a.js")
        );
    }

    #[test]
    fn test_output_path_outside_root() {
        let out = Path::new("dist");
        assert_eq!(
            output_path(out, "/project", "/vendor/lib/b.js"),
            Path::new("dist").join("b.js")
        );
        assert_eq!(
            output_path(out, "C:/project", "D:/lib/c.js"),
            Path::new("dist").join("c.js")
        );
    }

    #[test]
    fn test_options_from_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("spacey.json");
        fs::write(&config, r#"{ "__filename": true, "__dirname": true }"#).unwrap();

        let cli = Cli::parse_from([
            "spacey-pack",
            "--config",
            config.to_str().unwrap(),
            "--dirname",
            "mock",
            "a.js",
        ]);
        let options = load_options(&cli).unwrap();
        assert_eq!(options.filename, spacey_bundler::FilenameOption::Relative);
        assert_eq!(options.dirname, spacey_bundler::DirnameOption::Mock);
    }

    #[test]
    fn test_emit_writes_below_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "spacey-pack",
            "--out-dir",
            dir.path().to_str().unwrap(),
            "a.js",
        ]);
        let module = Module::new("/project/src/a.js");
        emit(&cli, "/project", &module, "code();").unwrap();
        let written = fs::read_to_string(dir.path().join("src").join("a.js")).unwrap();
        assert_eq!(written, "code();");
    }

    #[test]
    fn test_files_are_required() {
        assert!(Cli::try_parse_from(["spacey-pack"]).is_err());
    }
}
