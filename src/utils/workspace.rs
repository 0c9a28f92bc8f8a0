//! The workspace module locates the tinybatt workspace a path belongs to.

use super::paths::fix_unc_path;
use std::path::{Path, PathBuf};

/// Marker directory at the root of a workspace.
pub const WORKSPACE_DIR: &str = ".tinybatt";

/// Config file location, relative to the workspace root.
pub const CONFIG_FILE: &str = ".tinybatt/config.toml";

/// given a &Path `path`, return the path to the containing workspace.
///
/// # Errors
/// Error if the path doesn't exist or isn't inside a tinybatt workspace.
pub fn find_workspace_path(path: &Path) -> anyhow::Result<PathBuf> {
    let abs_path = fix_unc_path(&path.canonicalize()?);
    for working_path in abs_path.ancestors() {
        if working_path.join(WORKSPACE_DIR).is_dir() {
            return Ok(working_path.to_owned());
        }
    }
    anyhow::bail!(format!(
        "{} is not inside a tinybatt workspace. Create a `{WORKSPACE_DIR}` folder to mark one.",
        abs_path.to_string_lossy()
    ))
}
