//! Centralized application directory paths for glance.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution,
//! which is sandbox-transparent on macOS (returns container-relative paths
//! under App Sandbox automatically).
//!
//! Both paths can be overridden for testing or custom deployments:
//! - `GLANCE_DATA_DIR` — overrides [`data_dir`]
//! - `GLANCE_CONFIG_DIR` — overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Used for persistent user data, currently the saved-turn list.
///
/// Resolves to `dirs::data_dir()/glance/` by default. Override with
/// the `GLANCE_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("GLANCE_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("glance"))
        .unwrap_or_else(|| PathBuf::from("/tmp/glance-data"))
}

/// Application config directory, holding `config.toml`.
///
/// Resolves to `dirs::config_dir()/glance/` by default. Override with
/// the `GLANCE_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("GLANCE_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("glance"))
        .unwrap_or_else(|| PathBuf::from("/tmp/glance-config"))
}

/// Path of the saved-turn store file.
#[must_use]
pub fn saved_turns_path() -> PathBuf {
    data_dir().join("saved_turns.json")
}

/// Path of the engine config file.
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}
