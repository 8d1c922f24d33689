//! XDG Base Directory paths for excmd.
//!
//! | Purpose | XDG Variable | Default | excmd Path |
//! |---------|--------------|---------|------------|
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` | `$XDG_CONFIG_HOME/excmd/config.toml` |
//! | Startup script | `$XDG_CONFIG_HOME` | `~/.config` | `$XDG_CONFIG_HOME/excmd/excmdrc` |
//! | History | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/excmd/history.txt` |
//! | User commands | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/excmd/commands.json` |

use std::path::PathBuf;

use directories::BaseDirs;

/// Uses `$XDG_CONFIG_HOME/excmd` or falls back to `~/.config/excmd`.
pub fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".config"))
        .join("excmd")
}

/// Uses `$XDG_DATA_HOME/excmd` or falls back to `~/.local/share/excmd`.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".local").join("share"))
        .join("excmd")
}

/// Kernel configuration file.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Command script run at interactive start-up.
pub fn startup_script() -> PathBuf {
    config_dir().join("excmdrc")
}

/// Interactive command history.
pub fn history_file() -> PathBuf {
    data_dir().join("history.txt")
}

/// User commands saved between interactive sessions.
pub fn user_commands_file() -> PathBuf {
    data_dir().join("commands.json")
}

fn home_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
