// SPDX-License-Identifier: GPL-3.0-or-later

//! Locates the root of the checkout from a source file path.
//!
//! All include paths of the project are relative to the root, and the build
//! output directories live under it, so everything else hangs off this lookup.

use crate::config;
use std::path::{Path, PathBuf};

/// Finds the checkout root by ascending the parent directories of a file.
#[derive(Debug, Clone)]
pub struct RootLocator {
    markers: config::Root,
}

impl From<&config::Root> for RootLocator {
    fn from(markers: &config::Root) -> Self {
        Self { markers: markers.clone() }
    }
}

impl RootLocator {
    /// Returns the closest ancestor directory of `file` which qualifies as root.
    ///
    /// The `file` is expected to be absolute and normalized. The file itself
    /// is never considered, only its ancestors.
    pub fn locate(&self, file: &Path) -> Option<PathBuf> {
        let found = file.ancestors().skip(1).find(|candidate| self.is_root(candidate));
        match found {
            Some(root) => {
                log::debug!("Checkout root of {}: {}", file.display(), root.display());
                Some(root.to_path_buf())
            }
            None => {
                log::debug!("Checkout root of {} not found", file.display());
                None
            }
        }
    }

    fn is_root(&self, candidate: &Path) -> bool {
        let named = candidate.file_name().is_some_and(|name| name == self.markers.directory_name.as_str());
        if !named || !candidate.join(&self.markers.marker).exists() {
            return false;
        }
        let parent_marker = candidate.parent().is_some_and(|parent| parent.join(&self.markers.parent_marker).exists());
        parent_marker || candidate.join(&self.markers.vcs_marker).exists()
    }
}
