// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashSet;

// Directory of a `compile_commands.json` exported by `gn gen --export-compile-commands`.
pub const KEY_CHROMIUM__BUILD_DIR: &str = "CHROMIUM_BUILD_DIR";
// Base name of the build output directories under the checkout (`out` when unset).
pub const KEY_CHROMIUM__OUT_DIR: &str = "CHROMIUM_OUT_DIR";
// Legacy GYP setting, only the `output_dir=<name>` entry is read.
pub const KEY_GYP__GENERATOR_FLAGS: &str = "GYP_GENERATOR_FLAGS";

// man page for `exec` (Linux system call)
pub const KEY_OS__PATH: &str = "PATH";

// https://docs.rs/env_logger
pub const KEY_LOG__FILTER: &str = "RUST_LOG";

static BUILD_TREE_KEYS: std::sync::LazyLock<HashSet<&'static str>> =
    std::sync::LazyLock::new(|| {
        [KEY_CHROMIUM__BUILD_DIR, KEY_CHROMIUM__OUT_DIR, KEY_GYP__GENERATOR_FLAGS]
            .iter()
            .cloned()
            .collect()
    });

pub fn relevant_env(key: &str) -> bool {
    BUILD_TREE_KEYS.contains(key)
        || key == KEY_LOG__FILTER
        // Windows PATH variable is case sensitive and not always capitalized
        || key.to_uppercase() == KEY_OS__PATH
}

/// Extracts the `output_dir` value from a `GYP_GENERATOR_FLAGS` style string.
///
/// The flags are space separated `name=value` pairs, the last `output_dir`
/// entry wins.
pub fn gyp_output_dir(generator_flags: &str) -> Option<&str> {
    generator_flags
        .split(' ')
        .filter_map(|flag| flag.split_once('='))
        .filter(|(name, _)| *name == "output_dir")
        .map(|(_, value)| value)
        .last()
}
