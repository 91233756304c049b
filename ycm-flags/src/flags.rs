// SPDX-License-Identifier: GPL-3.0-or-later

//! Rewrites compiler command lines into flags for the completion engine.
//!
//! The completion engine parses the source with its own (usually older)
//! libclang, so the command line used for the build can't be passed over
//! unchanged:
//!
//! - include and framework paths are recorded relative to the build output
//!   directory, while the engine runs from elsewhere;
//! - a few flags make that libclang crash or fail to parse the translation unit.
//!
//! The rewrite is token by token and keeps the order of the tokens.

use crate::path;
use regex_lite::Regex;
use std::path::Path;
use std::sync::LazyLock;

static INCLUDE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-I|-isystem|-F)(.+)$").expect("include pattern is valid"));

/// Flags which crash libclang, kept out regardless of the category rules.
const DENIED_FLAGS: &[&str] = &["-Wno-deprecated-register", "-Wno-header-guard"];

/// `-march=armv7-a` fails with "Failed to parse the translation unit."
const DENIED_ARCH_PREFIX: &str = "-march=arm";

/// Flag categories (the character after the dash) which are passed through:
/// defines, warnings, features, machine and optimization flags.
const KEPT_CATEGORIES: &str = "DWfmO";

const SYSROOT_PREFIX: &str = "--sysroot=";

/// Splits the command line with shell quoting rules and rewrites the tokens.
///
/// A command line which can't be split yields no flags.
pub fn from_command_line(command_line: &str, out_dir: &Path) -> Vec<String> {
    match shell_words::split(command_line) {
        Ok(tokens) => rewrite(&tokens, out_dir),
        Err(error) => {
            log::warn!("Command line can't be split ({error}): {command_line}");
            Vec::new()
        }
    }
}

/// Rewrites the already split tokens, dropping the ones which are denied.
pub fn rewrite<S: AsRef<str>>(tokens: &[S], out_dir: &Path) -> Vec<String> {
    tokens.iter().filter_map(|token| rewrite_flag(token.as_ref(), out_dir)).collect()
}

/// Rewrites a single token. Returns `None` when the token has to be dropped.
pub fn rewrite_flag(flag: &str, out_dir: &Path) -> Option<String> {
    if let Some(captures) = INCLUDE_PATTERN.captures(flag) {
        // Relative paths are relative to the output directory, not the source.
        let resolved = path::absolute_to(out_dir, Path::new(&captures[2]));
        return Some(format!("{}{}", &captures[1], resolved.to_string_lossy()));
    }
    if flag.starts_with("-std") || flag == "-nostdinc++" {
        return Some(flag.to_string());
    }
    if flag.starts_with(DENIED_ARCH_PREFIX) {
        return None;
    }
    if is_kept_category(flag) {
        return (!DENIED_FLAGS.contains(&flag)).then(|| flag.to_string());
    }
    if let Some(sysroot) = flag.strip_prefix(SYSROOT_PREFIX) {
        let sysroot = Path::new(sysroot);
        if sysroot.is_absolute() {
            return Some(flag.to_string());
        }
        let resolved = path::absolute_to(out_dir, sysroot);
        return Some(format!("{}{}", SYSROOT_PREFIX, resolved.to_string_lossy()));
    }
    Some(flag.to_string())
}

fn is_kept_category(flag: &str) -> bool {
    let mut chars = flag.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|category| KEPT_CATEGORIES.contains(category))
}

/// Checks if the flags already select the source language (`-x <lang>` or `-x<lang>`).
pub fn selects_language<S: AsRef<str>>(flags: &[S]) -> bool {
    flags.iter().any(|flag| flag.as_ref().starts_with("-x"))
}
