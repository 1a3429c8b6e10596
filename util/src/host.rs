//! Host platform utility functions

use std::path::PathBuf;

/// Environment variable which points at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "PID_SW_ROOT";

/// Get the software root directory.
///
/// The root is read from the `PID_SW_ROOT` environment variable. If the variable isn't set the
/// current working directory is used instead.
pub fn get_sw_root() -> std::io::Result<PathBuf> {
    match std::env::var_os(SW_ROOT_ENV_VAR) {
        Some(root) => Ok(PathBuf::from(root)),
        None => std::env::current_dir()
    }
}
