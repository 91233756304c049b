// SPDX-License-Identifier: GPL-3.0-or-later

use crate::environment;
use anyhow::{Context as AnyhowContext, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Application context containing runtime environment information.
///
/// Captured once at startup, so the configuration and the resolver can work
/// from a snapshot instead of reading the process environment on every request.
#[derive(Debug, Clone)]
pub struct Context {
    /// Current working directory when the program was invoked
    pub current_directory: PathBuf,
    /// All environment variables at startup
    pub environment: HashMap<String, String>,
}

impl Context {
    /// Capture the current application context.
    pub fn capture() -> Result<Self> {
        let current_directory =
            env::current_dir().with_context(|| "Failed to get current working directory")?;

        let environment = env::vars().collect::<HashMap<String, String>>();

        Ok(Context { current_directory, environment })
    }

    /// Returns the value of a variable, treating empty values as unset.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }

    /// Makes the path absolute against the current directory.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        crate::path::absolute_to(&self.current_directory, path)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application Context:")?;
        writeln!(f, "Current Directory: {}", self.current_directory.display())?;
        writeln!(f, "Total Environment Variables: {} entries", self.environment.len())?;

        writeln!(f, "Relevant Environment Variables:")?;
        let mut relevant: Vec<_> =
            self.environment.iter().filter(|(key, _)| environment::relevant_env(key)).collect();
        relevant.sort();
        for (key, value) in relevant {
            writeln!(f, "  {}={}", key, value)?;
        }

        Ok(())
    }
}
