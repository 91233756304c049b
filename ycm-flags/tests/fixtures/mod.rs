// SPDX-License-Identifier: GPL-3.0-or-later

//! Test infrastructure for the command line tests.
//!
//! A `Checkout` is a scratch directory laid out like a Chromium checkout:
//!
//! ```text
//! <temp>/.gclient
//! <temp>/src/DEPS
//! <temp>/src/base/
//! ```
//!
//! The executable runs inside the `src` directory with a clean environment, so
//! neither the user's configuration nor the variables of the calling shell
//! leak into the tests.

use anyhow::{Context, Result};
use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const YCM_FLAGS_BIN: &str = "ycm-flags";

pub const BASELINE_FLAGS: [&str; 4] = ["-DUSE_CLANG_COMPLETER", "-std=c++14", "-x", "c++"];

/// The compiler command line the fake build tool prints.
#[allow(dead_code)]
pub const FAKE_COMMAND_LINE: &str = "../../third_party/llvm-build/Release+Asserts/bin/clang++ \
    -DFAKE_NINJA -I../.. -Igen -Wno-header-guard -march=armv7-a -c ../../base/logging.cc -o obj/base/base/logging.o";

pub struct Checkout {
    temp_dir: TempDir,
    pub root: PathBuf,
}

impl Checkout {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().with_context(|| "Failed to create temp dir")?;
        temp_dir.child("src/base").create_dir_all()?;
        temp_dir.child("home").create_dir_all()?;
        temp_dir.child("bin").create_dir_all()?;
        temp_dir.child(".gclient").touch()?;
        temp_dir.child("src/DEPS").touch()?;

        let root = temp_dir.path().canonicalize()?.join("src");
        Ok(Self { temp_dir, root })
    }

    /// The directory which contains the checkout root.
    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns the command to run from the given directory.
    pub fn command_in(&self, directory: &Path) -> Result<Command> {
        let home = self.temp_dir.child("home");
        let mut command = Command::cargo_bin(YCM_FLAGS_BIN)?;
        command
            .current_dir(directory)
            .env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path())
            .env_remove("CHROMIUM_BUILD_DIR")
            .env_remove("CHROMIUM_OUT_DIR")
            .env_remove("GYP_GENERATOR_FLAGS")
            .env_remove("RUST_LOG");
        Ok(command)
    }

    /// Returns the command to run from the checkout root.
    pub fn command(&self) -> Result<Command> {
        self.command_in(&self.root)
    }

    /// Writes the configuration file and returns its path.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        let config = self.temp_dir.child("ycm-flags.yml");
        config.write_str(content)?;
        Ok(config.path().to_path_buf())
    }

    /// Writes a compilation database into the output directory and returns the directory.
    #[allow(dead_code)]
    pub fn write_database(&self, out_dir: &str, entries: Value) -> Result<PathBuf> {
        let directory = self.root.join(out_dir);
        std::fs::create_dir_all(&directory)?;
        std::fs::write(directory.join("compile_commands.json"), serde_json::to_string_pretty(&entries)?)?;
        Ok(directory)
    }

    /// Writes a shell script which behaves like `ninja` for every source.
    ///
    /// `-t query` reports one object file, `-t commands` prints a helper
    /// command and the [`FAKE_COMMAND_LINE`].
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn fake_ninja(&self) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let script = self.temp_dir.child("bin/ninja");
        script.write_str(&format!(
            "#!/bin/sh\n\
             case \"$*\" in\n\
             *\"-t query\"*)\n\
             \x20 printf '%s:\\n  input: cxx\\n  outputs:\\n    obj/base/base/logging.o\\n' \"$5\"\n\
             \x20 ;;\n\
             *\"-t commands\"*)\n\
             \x20 echo \"python3 ../../build/write_buildflag_header.py --output gen/base/buildflags.h\"\n\
             \x20 echo \"{FAKE_COMMAND_LINE}\"\n\
             \x20 ;;\n\
             *)\n\
             \x20 exit 1\n\
             \x20 ;;\n\
             esac\n"
        ))?;
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755))?;
        Ok(script.path().to_path_buf())
    }
}

/// Parses the standard output, one JSON response per line.
pub fn responses(stdout: &[u8]) -> Result<Vec<Value>> {
    let stdout = std::str::from_utf8(stdout)?;
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).with_context(|| format!("Invalid response: {line}")))
        .collect()
}

/// Returns the flags of a response as strings.
pub fn flags(response: &Value) -> Vec<String> {
    response["flags"]
        .as_array()
        .map(|flags| flags.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// The flags every response inside the checkout starts with.
pub fn checkout_flags(root: &Path) -> Vec<String> {
    let mut result: Vec<String> = BASELINE_FLAGS.iter().map(ToString::to_string).collect();
    result.push(format!("-I{}", root.display()));
    result.push("-Wno-unknown-warning-option".to_string());
    result
}
