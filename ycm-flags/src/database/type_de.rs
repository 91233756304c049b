// SPDX-License-Identifier: GPL-3.0-or-later

//! Implements deserialization of the `Entry` struct.
//!
//! The `command` and `arguments` fields are alternatives: exactly one of them
//! has to be present. Both end up as an argument vector. Fields which are not
//! part of the format (generators add their own) are ignored.

use serde::de::{self, Deserialize, Deserializer};
use std::path;
use thiserror::Error;

use super::Entry;

/// The entry as it is written in the file.
#[derive(serde::Deserialize)]
struct RawEntry {
    directory: path::PathBuf,
    file: path::PathBuf,
    command: Option<String>,
    arguments: Option<Vec<String>>,
    output: Option<path::PathBuf>,
}

#[derive(Debug, Error)]
enum EntryError {
    #[error("missing field `command` or `arguments`")]
    MissingCommand,
    #[error("either `command` or `arguments` field need to be specified, but not both")]
    AmbiguousCommand,
    #[error("invalid shell command '{command}': {source}")]
    InvalidCommand {
        command: String,
        #[source]
        source: shell_words::ParseError,
    },
}

impl RawEntry {
    fn into_entry(self) -> Result<Entry, EntryError> {
        let arguments = match (self.arguments, self.command) {
            (Some(arguments), None) => arguments,
            (None, Some(command)) => shell_words::split(&command)
                .map_err(|source| EntryError::InvalidCommand { command, source })?,
            (None, None) => return Err(EntryError::MissingCommand),
            (Some(_), Some(_)) => return Err(EntryError::AmbiguousCommand),
        };

        Ok(Entry { file: self.file, arguments, directory: self.directory, output: self.output })
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawEntry::deserialize(deserializer)?.into_entry().map_err(de::Error::custom)
    }
}
