// SPDX-License-Identifier: GPL-3.0-or-later

//! Finds the build output directory of a checkout.
//!
//! Chromium builds into `<root>/out/<config>` by default, where multiple
//! configurations can live side by side. The most recently built one is
//! assumed to be the interesting one.

use crate::context::Context;
use crate::{config, environment, path};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const DEFAULT_OUT_DIR: &str = "out";
const DEFAULT_CONFIGURATION: &str = "Debug";
const BUILD_FILE: &str = "build.ninja";
const DEPS_LOG: &str = ".ninja_deps";

/// Returns the build output directory for the checkout root.
///
/// An explicitly configured directory is used as is. Otherwise the newest
/// configuration under the output base directory is taken, and `Debug` when
/// there is none.
pub fn discover(root: &Path, context: &Context, build: &config::Build) -> PathBuf {
    if let Some(configured) = &build.output_directory {
        return path::absolute_to(root, configured);
    }

    let base = root.join(base_name(context));
    let newest = configurations(&base).into_iter().max_by_key(|(_, modified)| *modified).map(|(dir, _)| dir);
    match newest {
        Some(directory) => {
            log::debug!("Build output directory: {}", directory.display());
            directory
        }
        None => {
            let directory = base.join(DEFAULT_CONFIGURATION);
            log::debug!("No build output directory found, using: {}", directory.display());
            directory
        }
    }
}

/// The name of the output base directory under the root.
fn base_name(context: &Context) -> String {
    if let Some(out_dir) = context.var(environment::KEY_CHROMIUM__OUT_DIR) {
        return out_dir.to_string();
    }
    context
        .var(environment::KEY_GYP__GENERATOR_FLAGS)
        .and_then(environment::gyp_output_dir)
        .unwrap_or(DEFAULT_OUT_DIR)
        .to_string()
}

/// Lists the directories which have a build file, with their last build time.
fn configurations(base: &Path) -> Vec<(PathBuf, SystemTime)> {
    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(error) => {
            log::debug!("Can't list build output directories in {}: {error}", base.display());
            return Vec::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|directory| directory.join(BUILD_FILE).is_file())
        .filter_map(|directory| {
            let modified = last_build_time(&directory)?;
            Some((directory, modified))
        })
        .collect()
}

/// The deps log is written by every build, the build file only by `gn gen`.
fn last_build_time(directory: &Path) -> Option<SystemTime> {
    [DEPS_LOG, BUILD_FILE]
        .iter()
        .find_map(|name| fs::metadata(directory.join(name)).and_then(|metadata| metadata.modified()).ok())
}
