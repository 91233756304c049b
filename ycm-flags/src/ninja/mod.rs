// SPDX-License-Identifier: GPL-3.0-or-later

//! Asks the build tool how a source file is compiled.
//!
//! When the compilation database does not know the file, the build graph in the
//! output directory still does. Two `ninja` tools are used:
//!
//! - `ninja -C <out> -t query <source>` lists the outputs which depend on the
//!   source file. The object files among them are the compilation targets.
//! - `ninja -v -C <out> -t commands <target>` prints the commands which build
//!   the target and its dependencies, the compilation of the target being last.
//!
//! The output directory itself is found by the [`out_dir`] module.

pub mod out_dir;

use crate::path;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// The text interface of the build tool.
///
/// Implementations return the standard output of the tool, or an error when
/// the tool could not run or reported a failure.
pub trait BuildTool {
    /// Returns the description of the build edges around the source file.
    fn query(&self, out_dir: &Path, source: &Path) -> Result<String, ToolError>;

    /// Returns the commands to build the target, one command per line.
    fn commands(&self, out_dir: &Path, target: &str) -> Result<String, ToolError>;
}

/// Runs the `ninja` executable.
#[derive(Debug, Clone)]
pub struct Ninja {
    program: PathBuf,
}

impl Ninja {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    fn run(&self, command: &mut Command) -> Result<String, ToolError> {
        log::debug!("Running build tool: {command:?}");
        let output = command
            .output()
            .map_err(|source| ToolError::ProcessSpawn { executable: self.program.clone(), source })?;

        if !output.stderr.is_empty() {
            log::debug!("Build tool stderr: {}", String::from_utf8_lossy(&output.stderr).trim_end());
        }
        if !output.status.success() {
            return Err(ToolError::ExitStatus {
                executable: self.program.clone(),
                status: output.status.code(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl BuildTool for Ninja {
    fn query(&self, out_dir: &Path, source: &Path) -> Result<String, ToolError> {
        // The build graph refers to the sources relative to the output directory.
        let relative = path::relative_to(out_dir, source).unwrap_or_else(|_| source.to_path_buf());

        self.run(Command::new(&self.program).arg("-C").arg(out_dir).args(["-t", "query"]).arg(relative))
    }

    fn commands(&self, out_dir: &Path, target: &str) -> Result<String, ToolError> {
        self.run(Command::new(&self.program).arg("-v").arg("-C").arg(out_dir).args(["-t", "commands", target]))
    }
}

/// Errors of the build tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to execute '{executable}': {source}", executable = executable.display())]
    ProcessSpawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Build tool '{executable}' failed with exit code {status:?}", executable = executable.display())]
    ExitStatus { executable: PathBuf, status: Option<i32> },
}

/// Finds the compiler command line of a source file with the build tool.
pub struct CommandLineFinder<'a> {
    tool: &'a dyn BuildTool,
    compiler: &'a str,
}

impl<'a> CommandLineFinder<'a> {
    pub fn new(tool: &'a dyn BuildTool, compiler: &'a str) -> Self {
        Self { tool, compiler }
    }

    /// Returns the compiler command line which builds the source file.
    ///
    /// The same source can be compiled by multiple toolchains; the first object
    /// target which yields a command line wins.
    pub fn find(&self, out_dir: &Path, source: &Path) -> Option<String> {
        let targets = match self.tool.query(out_dir, source) {
            Ok(stdout) => object_outputs(&stdout),
            Err(error) => {
                log::debug!("Build tool query for {} failed: {error}", source.display());
                return None;
            }
        };
        log::debug!("Build targets of {}: {targets:?}", source.display());

        targets.iter().find_map(|target| match self.tool.commands(out_dir, target) {
            Ok(stdout) => last_command_line(&stdout, self.compiler).map(str::to_string),
            Err(error) => {
                log::debug!("Build tool commands for {target} failed: {error}");
                None
            }
        })
    }
}

/// Extracts the object file outputs from the output of `ninja -t query`.
///
/// The output looks like:
///
/// ```text
/// ../../base/logging.cc:
///   outputs:
///     obj/base/base/logging.o
///     obj/base/base_static/logging.o
///     gen/base/logging.stamp
/// ```
pub fn object_outputs(stdout: &str) -> Vec<String> {
    let Some((_, outputs)) = stdout.split_once("\n  outputs:\n") else {
        return Vec::new();
    };
    outputs
        .lines()
        .map(str::trim)
        .filter(|line| line.ends_with(".o") || line.ends_with(".obj"))
        .map(str::to_string)
        .collect()
}

/// Returns the last line which mentions the compiler.
///
/// The commands of the dependencies come first, the target itself is built by
/// the last compiler invocation.
pub fn last_command_line<'a>(stdout: &'a str, compiler: &str) -> Option<&'a str> {
    stdout.lines().rev().find(|line| line.contains(compiler))
}

/// Returns a source file which is compiled with flags close enough to the
/// ones the given file would get.
///
/// Used when the build graph does not know the file (new file, stale graph).
pub fn default_source(root: &Path, file: &Path) -> PathBuf {
    let blink_root = root.join("third_party").join("WebKit");
    if file.starts_with(&blink_root) {
        blink_root.join("Source").join("core").join("CoreInitializer.cpp")
    } else if file.to_string_lossy().contains("test.") {
        root.join("base").join("logging_unittest.cc")
    } else {
        root.join("base").join("logging.cc")
    }
}
