// SPDX-License-Identifier: GPL-3.0-or-later

//! This module provides read access to a JSON compilation database.
//!
//! A compilation database is a set of records which describe the compilation of the
//! source files in a given project. The definition of the JSON compilation database
//! files is done in the LLVM project
//! [documentation](https://clang.llvm.org/docs/JSONCompilationDatabase.html).
//!
//! For Chromium the database is generated by `gn gen --export-compile-commands`
//! into the build output directory, which is then named by the `CHROMIUM_BUILD_DIR`
//! environment variable. The database is loaded once and kept for the lifetime
//! of the process.

mod type_de;

use crate::path;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// The file name of the database inside the configured directory.
pub const DATABASE_FILE_NAME: &str = "compile_commands.json";

/// Represents an entry of the compilation database.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// The main translation unit source processed by this compilation step.
    pub file: PathBuf,
    /// The compile command argv as list of strings.
    pub arguments: Vec<String>,
    /// The working directory of the compilation. Relative paths in the
    /// arguments and the `file` field are relative to this directory.
    pub directory: PathBuf,
    /// The name of the output created by this compilation step.
    pub output: Option<PathBuf>,
}

/// The compiler flags recorded for a source file.
#[derive(Clone, Debug, PartialEq)]
pub struct Record<'a> {
    /// The candidate file which was found in the database.
    pub file: &'a Path,
    /// The working directory of the compilation.
    pub directory: &'a Path,
    /// The compiler arguments without the compiler executable.
    pub flags: &'a [String],
    /// The output of the compilation, when the database names it.
    pub output: Option<&'a Path>,
}

/// A compilation database indexed by the absolute path of the source files.
#[derive(Debug, Default)]
pub struct CompilationDatabase {
    records: HashMap<PathBuf, Entry>,
}

impl CompilationDatabase {
    /// Loads the `compile_commands.json` file from the given directory.
    pub fn load(directory: &Path) -> Result<Self, DatabaseError> {
        let file_name = directory.join(DATABASE_FILE_NAME);
        log::info!("Loading compilation database: {}", file_name.display());

        let reader = fs::File::open(&file_name)
            .map(io::BufReader::new)
            .map_err(|source| DatabaseError::FileAccess { path: file_name.clone(), source })?;

        Self::from_reader(reader).map_err(|source| DatabaseError::Parse { path: file_name, source })
    }

    /// Reads the database content.
    ///
    /// The top level JSON array is mandatory, but entries which can't be
    /// interpreted are skipped with a warning.
    pub fn from_reader(reader: impl io::Read) -> Result<Self, serde_json::Error> {
        let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;

        let mut records = HashMap::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<Entry>(value) {
                Ok(entry) => {
                    let key = path::absolute_to(&entry.directory, &entry.file);
                    // Keep the first record when a file is compiled multiple times.
                    records.entry(key).or_insert(entry);
                }
                Err(error) => {
                    log::warn!("Compilation database entry #{index} ignored: {error}");
                }
            }
        }
        log::debug!("Compilation database has {} records", records.len());

        Ok(Self { records })
    }

    /// Returns the first record which matches any of the candidates.
    ///
    /// The candidates are tried in order, and expected to be absolute paths.
    pub fn lookup<'a>(&'a self, candidates: &[PathBuf]) -> Option<Record<'a>> {
        candidates.iter().find_map(|candidate| {
            let entry = self.records.get(&path::normalize(candidate))?;
            match &entry.output {
                Some(output) => log::debug!(
                    "Compilation database has record for {} (output: {})",
                    candidate.display(),
                    output.display()
                ),
                None => log::debug!("Compilation database has record for {}", candidate.display()),
            }
            Some(Record {
                file: entry.file.as_path(),
                directory: entry.directory.as_path(),
                flags: entry.arguments.get(1..).unwrap_or_default(),
                output: entry.output.as_deref(),
            })
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

static SHARED: OnceLock<Option<CompilationDatabase>> = OnceLock::new();

/// Returns the process wide database.
///
/// The first call loads the database from the given directory; later calls
/// return the same instance and ignore the argument. A database which can't
/// be loaded is reported once and treated as absent.
pub fn shared(directory: Option<&Path>) -> Option<&'static CompilationDatabase> {
    SHARED.get_or_init(|| open(directory?)).as_ref()
}

/// Loads the database, or reports why it can't be used.
fn open(directory: &Path) -> Option<CompilationDatabase> {
    if !directory.exists() {
        log::warn!("Compilation database directory does not exist: {}", directory.display());
        return None;
    }
    let database = CompilationDatabase::load(directory).inspect_err(|error| log::warn!("{error}")).ok()?;
    if database.is_empty() {
        log::warn!("Compilation database in {} has no usable records", directory.display());
    }
    Some(database)
}

/// Represents errors that can occur while loading the database.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to access compilation database '{path}': {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse compilation database '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
