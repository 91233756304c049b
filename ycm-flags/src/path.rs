// SPDX-License-Identifier: GPL-3.0-or-later

//! Lexical path manipulation.
//!
//! Paths in compiler command lines are recorded relative to the build output
//! directory, and the build tool wants source files relative to the same
//! directory. None of these conversions are allowed to touch the filesystem:
//! the referenced files might not exist (generated headers, stale builds), and
//! symlinks in the checkout must stay as the build tool sees them.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Path {0} can't be relative to {1}")]
    PathsCannotBeRelative(PathBuf, PathBuf),
}

/// Removes the `.` components and folds the `..` components into their parents.
///
/// A `..` right after the root is dropped (`/..` is `/`), while the leading
/// `..` components of a relative path are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last().copied() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    if components.is_empty() {
        PathBuf::from(".")
    } else {
        components.iter().collect()
    }
}

/// Compute the absolute path from the root directory if the path is relative.
pub fn absolute_to(root: &Path, path: &Path) -> PathBuf {
    // `join` replaces the root when the path is absolute.
    normalize(&root.join(path))
}

/// Compute the relative path from the root directory.
///
/// Both arguments are expected to be normalized absolute paths.
pub fn relative_to(root: &Path, path: &Path) -> Result<PathBuf, PathError> {
    let mut root_components = root.components();
    let mut path_components = path.components();

    let mut remaining_root_components = Vec::new();
    let mut remaining_path_components = Vec::new();

    // Find the common prefix
    loop {
        let root_comp = root_components.next();
        let path_comp = path_components.next();
        match (root_comp, path_comp) {
            (Some(root), Some(path)) if root != path => {
                remaining_root_components.push(root);
                remaining_root_components.extend(root_components);
                remaining_path_components.push(path);
                remaining_path_components.extend(path_components);
                break;
            }
            (Some(root), None) => {
                remaining_root_components.push(root);
                remaining_root_components.extend(root_components);
                break;
            }
            (None, Some(path)) => {
                remaining_path_components.push(path);
                remaining_path_components.extend(path_components);
                break;
            }
            (None, None) => break,
            _ => continue,
        }
    }

    let mut result = PathBuf::new();
    for component in remaining_root_components {
        match component {
            Component::Normal(_) => result.push(Component::ParentDir),
            Component::CurDir => {}
            _ => {
                return Err(PathError::PathsCannotBeRelative(path.to_path_buf(), root.to_path_buf()));
            }
        }
    }

    for component in remaining_path_components {
        match component {
            Component::Normal(_) | Component::ParentDir => result.push(component),
            Component::CurDir => {}
            _ => {
                return Err(PathError::PathsCannotBeRelative(path.to_path_buf(), root.to_path_buf()));
            }
        }
    }

    if result.as_os_str().is_empty() {
        result.push(Component::CurDir);
    }
    Ok(result)
}

/// Returns the extension of the path with the leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default()
}
