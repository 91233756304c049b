// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code. The defaults describe a Chromium
//! checkout built with `gn` and `ninja`, so most users never need a file.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `ycm-flags.yml`.
//!
//! The configuration file location is searched in the following order:
//! 1. The current working directory
//! 2. The local configuration directory of the user
//! 3. The configuration directory of the user
//! 4. The local configuration directory of the application
//! 5. The configuration directory of the application
//!
//! ```yaml
//! schema: 1.0
//!
//! root:
//!   directory_name: src
//!   marker: DEPS
//!   parent_marker: .gclient
//!   vcs_marker: .git
//!
//! database:
//!   directory: /home/user/chromium/src/out/Release
//!
//! build:
//!   program: /opt/depot_tools/ninja
//!   compiler: clang
//!   output_directory: out/Release
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::Validator;

mod types {
    use serde::Deserialize;
    use std::fmt;
    use std::path::PathBuf;

    /// Represents the application configuration.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version")]
        pub schema: String,
        #[serde(default)]
        pub root: Root,
        #[serde(default)]
        pub database: Database,
        #[serde(default)]
        pub build: Build,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: String::from(SUPPORTED_SCHEMA_VERSION),
                root: Root::default(),
                database: Database::default(),
                build: Build::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            let yaml_string = serde_yml::to_string(self).map_err(|_| fmt::Error)?;
            for line in yaml_string.lines() {
                writeln!(f, "{}", line)?;
            }
            Ok(())
        }
    }

    /// The marker files which identify the root of the checkout.
    ///
    /// A directory is the root when its name is `directory_name`, it contains
    /// the `marker` file, and either `parent_marker` exists next to it or
    /// `vcs_marker` exists inside it.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    #[serde(default)]
    pub struct Root {
        pub directory_name: String,
        pub marker: String,
        pub parent_marker: String,
        pub vcs_marker: String,
    }

    impl Default for Root {
        fn default() -> Self {
            Self {
                directory_name: String::from("src"),
                marker: String::from("DEPS"),
                parent_marker: String::from(".gclient"),
                vcs_marker: String::from(".git"),
            }
        }
    }

    /// Location of the pre-generated compilation database.
    ///
    /// The `CHROMIUM_BUILD_DIR` environment variable takes precedence.
    #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Database {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub directory: Option<PathBuf>,
    }

    /// How to query the build tool for compiler command lines.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    #[serde(default)]
    pub struct Build {
        /// The build tool executable, looked up on `PATH` when not a path.
        pub program: PathBuf,
        /// Substring which identifies the compiler in a command line.
        pub compiler: String,
        /// Skips the output directory discovery when present. Relative paths
        /// are relative to the checkout root.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub output_directory: Option<PathBuf>,
    }

    impl Default for Build {
        fn default() -> Self {
            Self { program: PathBuf::from("ninja"), compiler: String::from("clang"), output_directory: None }
        }
    }

    pub(super) const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

    /// YAML reads an unquoted `1.0` as a number, a quoted one as a string.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SchemaVersion {
        Text(String),
        Number(f64),
    }

    impl From<SchemaVersion> for String {
        fn from(version: SchemaVersion) -> Self {
            match version {
                SchemaVersion::Text(text) => text,
                SchemaVersion::Number(number) if number.fract() == 0.0 => format!("{number:.1}"),
                SchemaVersion::Number(number) => number.to_string(),
            }
        }
    }

    // Custom deserialization function to validate the schema version
    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema = String::from(SchemaVersion::deserialize(deserializer)?);
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {

    use super::types::*;
    use std::path::Path;
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("Empty string value for field '{field}'")]
        EmptyString { field: &'static str },
        #[error("Value of field '{field}' must be a plain file name: '{value}'")]
        NotFileName { field: &'static str, value: String },
        #[error("Path does not exist: '{path}'")]
        PathNotFound { path: String },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Combinator for collecting and handling validation errors
    #[derive(Default)]
    struct ValidationCollector {
        errors: Vec<ValidationError>,
    }

    impl ValidationCollector {
        fn add(&mut self, error: ValidationError) {
            self.errors.push(error);
        }

        fn add_result(&mut self, result: Result<(), ValidationError>) {
            if let Err(error) = result {
                match error {
                    ValidationError::Multiple { errors } => {
                        self.errors.extend(errors);
                    }
                    single_error => self.errors.push(single_error),
                }
            }
        }

        fn finish(mut self) -> Result<(), ValidationError> {
            match self.errors.len() {
                0 => Ok(()),
                1 => Err(self.errors.remove(0)),
                _ => Err(ValidationError::Multiple { errors: self.errors }),
            }
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();

            collector.add_result(Root::validate(&config.root));
            collector.add_result(Database::validate(&config.database));
            collector.add_result(Build::validate(&config.build));

            collector.finish()
        }
    }

    impl Validator<Root> for Root {
        type Error = ValidationError;

        fn validate(config: &Root) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();

            let fields = [
                ("root.directory_name", &config.directory_name),
                ("root.marker", &config.marker),
                ("root.parent_marker", &config.parent_marker),
                ("root.vcs_marker", &config.vcs_marker),
            ];
            for (field, value) in fields {
                if value.is_empty() {
                    collector.add(ValidationError::EmptyString { field });
                } else if !is_file_name(value) {
                    collector.add(ValidationError::NotFileName { field, value: value.clone() });
                }
            }

            collector.finish()
        }
    }

    impl Validator<Database> for Database {
        type Error = ValidationError;

        fn validate(config: &Database) -> Result<(), Self::Error> {
            match &config.directory {
                Some(path) if !path.is_dir() => {
                    Err(ValidationError::PathNotFound { path: path.display().to_string() })
                }
                _ => Ok(()),
            }
        }
    }

    impl Validator<Build> for Build {
        type Error = ValidationError;

        fn validate(config: &Build) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();

            if config.program.as_os_str().is_empty() {
                collector.add(ValidationError::EmptyString { field: "build.program" });
            }
            if config.compiler.is_empty() {
                collector.add(ValidationError::EmptyString { field: "build.compiler" });
            }
            if let Some(path) = &config.output_directory {
                if path.as_os_str().is_empty() {
                    collector.add(ValidationError::EmptyString { field: "build.output_directory" });
                }
            }

            collector.finish()
        }
    }

    /// The marker names are joined to directories, so they can't be paths.
    fn is_file_name(value: &str) -> bool {
        let path = Path::new(value);
        path.file_name().is_some_and(|name| name == path.as_os_str())
    }

}

mod loader {
    use super::types::*;
    use super::validation::Validator;
    use crate::context::Context;
    use directories::{BaseDirs, ProjectDirs};
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    const CONFIGURATION_FILE_NAME: &str = "ycm-flags.yml";

    /// Responsible for loading the configuration file.
    pub struct Loader {}

    impl Loader {
        /// Loads the given configuration file, or the first one found in the
        /// default locations.
        ///
        /// An explicitly given file has to exist. Without any file the default
        /// configuration is returned.
        pub fn load(context: &Context, filename: &Option<String>) -> Result<Main, ConfigError> {
            let explicit = filename.as_deref().map(|name| context.absolute(Path::new(name)));
            let found = explicit.or_else(|| {
                Self::file_locations(context)
                    .into_iter()
                    .inspect(|candidate| log::debug!("Looking for configuration file: {}", candidate.display()))
                    .find(|candidate| candidate.is_file())
            });

            match found {
                Some(path) => Self::from_file(&path),
                None => {
                    log::debug!("No configuration file found, using the defaults.");
                    Ok(Main::default())
                }
            }
        }

        /// The candidate files, from the most specific location to the least.
        fn file_locations(context: &Context) -> Vec<PathBuf> {
            let user = BaseDirs::new()
                .map(|dirs| [dirs.config_local_dir().to_path_buf(), dirs.config_dir().to_path_buf()]);
            let application = ProjectDirs::from("com.github", "rizsotto", "ycm-flags")
                .map(|dirs| [dirs.config_local_dir().to_path_buf(), dirs.config_dir().to_path_buf()]);

            let mut directories = vec![context.current_directory.clone()];
            directories.extend(user.into_iter().flatten());
            directories.extend(application.into_iter().flatten());
            // On some platforms the local and the roaming directories are the same.
            directories.dedup();

            directories.into_iter().map(|directory| directory.join(CONFIGURATION_FILE_NAME)).collect()
        }

        /// Reads and validates the configuration file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            log::info!("Loading configuration file: {}", path.display());

            let reader = fs::File::open(path)
                .map(io::BufReader::new)
                .map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;
            let config: Main = Self::from_reader(reader)
                .map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;
            Main::validate(&config)
                .map_err(|source| ConfigError::ValidationError { path: path.to_path_buf(), source })?;

            Ok(config)
        }

        /// The file format is YAML.
        pub(super) fn from_reader<R, T>(reader: R) -> serde_yml::Result<T>
        where
            R: io::Read,
            T: serde::de::DeserializeOwned + 'static,
        {
            serde_yml::from_reader(reader)
        }
    }

    /// Represents all possible configuration-related errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// Error when opening or reading a configuration file.
        #[error("Failed to access configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        /// Error when parsing the configuration file format.
        #[error("Failed to parse configuration from file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        /// Error when configuration validation fails.
        #[error("Configuration validation failed for '{path}': {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: super::validation::ValidationError,
        },
    }

}
