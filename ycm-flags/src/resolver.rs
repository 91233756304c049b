// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolves the compiler flags of a source file.
//!
//! The flags are derived from the compilation database when it knows the file,
//! otherwise from the build graph of the checkout. Whatever is found is put
//! behind a fixed set of baseline flags, so the completion engine always gets
//! something to parse with.

use crate::config;
use crate::context::Context;
use crate::database::CompilationDatabase;
use crate::flags;
use crate::ninja::{self, BuildTool, CommandLineFinder, out_dir};
use crate::path;
use crate::root::RootLocator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Flags which are passed for every file.
pub const BASELINE_FLAGS: [&str; 4] = ["-DUSE_CLANG_COMPLETER", "-std=c++14", "-x", "c++"];

/// Newer compilers know warnings the completion engine's libclang does not.
const UNKNOWN_WARNING_FLAG: &str = "-Wno-unknown-warning-option";

/// Extensions of the sources which may include a header, in lookup order.
const HEADER_ALTERNATES: [&str; 5] = ["cc", "cpp", "c", "mm", "m"];

/// The request of the completion engine.
///
/// Only the file name is used, other keys are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Request {
    pub filename: PathBuf,
}

/// The flags of a file and whether the engine may keep them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub flags: Vec<String>,
    #[serde(rename = "do_cache")]
    pub cacheable: bool,
}

impl Response {
    /// The response when nothing could be resolved: baseline flags, not cached.
    pub fn fallback() -> Self {
        Self { flags: baseline(), cacheable: false }
    }
}

fn baseline() -> Vec<String> {
    BASELINE_FLAGS.iter().map(ToString::to_string).collect()
}

/// Returns the files which are compiled with the flags of the given file.
///
/// Headers are not compiled on their own, so the sources with the same base
/// name are tried instead. Any other file is its own candidate.
pub fn candidates(file: &Path) -> Vec<PathBuf> {
    if path::dotted_extension(file) == ".h" {
        HEADER_ALTERNATES.iter().map(|extension| file.with_extension(extension)).collect()
    } else {
        vec![file.to_path_buf()]
    }
}

/// Returns the language selection flags for Objective-C sources.
pub fn extension_flags(file: &Path) -> &'static [&'static str] {
    match path::dotted_extension(file).as_str() {
        ".m" => &["-x", "objective-c"],
        ".mm" => &["-x", "objective-c++"],
        _ => &[],
    }
}

/// Flags derived from a compilation, with the file which was actually found.
struct Derived {
    flags: Vec<String>,
    buildable: PathBuf,
}

/// Resolves the flags of source files.
///
/// The compilation database is optional; the build tool is used for the files
/// the database does not know.
pub struct Resolver<'a> {
    context: Context,
    build: config::Build,
    locator: RootLocator,
    database: Option<&'a CompilationDatabase>,
    tool: Box<dyn BuildTool + 'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        context: Context,
        config: &config::Main,
        database: Option<&'a CompilationDatabase>,
        tool: Box<dyn BuildTool + 'a>,
    ) -> Self {
        Self {
            context,
            build: config.build.clone(),
            locator: RootLocator::from(&config.root),
            database,
            tool,
        }
    }

    /// Returns the flags for the file.
    ///
    /// Never fails: everything which goes wrong ends up in the log and in a
    /// response which the engine will ask for again.
    pub fn resolve(&self, file: &Path) -> Response {
        let file = self.context.absolute(file);
        let Some(root) = self.locator.locate(&file) else {
            log::warn!("{} is not in a checkout, using baseline flags", file.display());
            return Response::fallback();
        };

        let derived = self.from_database(&file).or_else(|| self.from_build_tool(&root, &file));
        let Derived { flags: derived, buildable } = derived.unwrap_or_else(|| {
            log::warn!("No compiler flags found for {}", file.display());
            Derived { flags: Vec::new(), buildable: file.clone() }
        });

        let mut flags = baseline();
        flags.push(format!("-I{}", root.display()));
        flags.push(UNKNOWN_WARNING_FLAG.to_string());
        if !flags::selects_language(&derived) {
            flags.extend(extension_flags(&buildable).iter().map(ToString::to_string));
        }

        let cacheable = !derived.is_empty();
        flags.extend(derived);
        log::debug!("Flags for {}: {flags:?} (cacheable: {cacheable})", file.display());

        Response { flags, cacheable }
    }

    /// A record in the database is final, even when it has no flags.
    fn from_database(&self, file: &Path) -> Option<Derived> {
        let record = self.database?.lookup(&candidates(file))?;
        Some(Derived {
            flags: flags::rewrite(record.flags, record.directory),
            buildable: record.file.to_path_buf(),
        })
    }

    fn from_build_tool(&self, root: &Path, file: &Path) -> Option<Derived> {
        let out_dir = out_dir::discover(root, &self.context, &self.build);
        let finder = CommandLineFinder::new(self.tool.as_ref(), &self.build.compiler);

        let found = candidates(file)
            .into_iter()
            .find_map(|candidate| finder.find(&out_dir, &candidate).map(|line| (line, candidate)));
        let (command_line, buildable) = match found {
            Some(found) => found,
            None => {
                // The file might be new, or the build graph stale.
                let source = ninja::default_source(root, file);
                log::debug!("Falling back to the flags of {}", source.display());
                (finder.find(&out_dir, &source)?, file.to_path_buf())
            }
        };

        Some(Derived { flags: flags::from_command_line(&command_line, &out_dir), buildable })
    }
}
