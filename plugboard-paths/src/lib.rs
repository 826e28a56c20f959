//! XDG Base Directory paths for plugboard.
//!
//! Host configuration (disabled plugins, per-plugin settings) lives under the
//! config directory so every host embedding plugboard finds it in one place.

use std::path::PathBuf;

/// Name of the host configuration file inside [`config_dir`].
pub const HOST_CONFIG_FILE: &str = "plugins.toml";

/// Get the plugboard config directory.
///
/// Returns `$XDG_CONFIG_HOME/plugboard` if set, otherwise `~/.config/plugboard`.
///
/// # Examples
///
/// ```
/// use plugboard_paths::config_dir;
///
/// let config = config_dir();
/// let host_config = config.join("plugins.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("plugboard")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/plugboard")
    } else {
        PathBuf::from(".config/plugboard")
    }
}

/// Default location of the host configuration file.
pub fn host_config_path() -> PathBuf {
    config_dir().join(HOST_CONFIG_FILE)
}
