//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the service persists (the SQLite
//! database). It is resolved from four sources in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `KSC_ROOT` environment variable
//! 3. `root_folder` key in the TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_ENV_VAR: &str = "KSC_ROOT";

/// Environment variable overriding the listen port
pub const PORT_ENV_VAR: &str = "KSC_PORT";

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 5734;

/// Resolves the root folder for a module following the 4-tier priority order
pub struct RootFolderResolver {
    module_name: String,
}

impl RootFolderResolver {
    /// Create a resolver for the named module (used in log output only)
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// Resolve the root folder, consulting the CLI argument first
    pub fn resolve(&self, cli_arg: Option<&str>) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return PathBuf::from(path);
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Ok(config) = load_config_file() {
            if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                return PathBuf::from(root_folder);
            }
        }

        // Priority 4: OS-dependent compiled default
        tracing::debug!(
            "No root folder configured for {}, using platform default",
            self.module_name
        );
        default_root_folder()
    }
}

/// Prepares a resolved root folder for use
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root.join("ksc.db")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Resolve the HTTP listen port: CLI argument, then `KSC_PORT`, then the
/// `port` key of the config file, then the compiled default.
pub fn resolve_port(cli_arg: Option<u16>) -> u16 {
    if let Some(port) = cli_arg {
        return port;
    }

    if let Ok(value) = std::env::var(PORT_ENV_VAR) {
        if let Ok(port) = value.parse::<u16>() {
            return port;
        }
    }

    if let Ok(config) = load_config_file() {
        if let Some(port) = config.get("port").and_then(|v| v.as_integer()) {
            if (1..=65535).contains(&port) {
                return port as u16;
            }
        }
    }

    DEFAULT_PORT
}

/// Load and parse the platform config file (`<config dir>/ksc/config.toml`)
fn load_config_file() -> Result<toml::Value> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Cannot parse {}: {}", path.display(), e)))
}

/// Locate the config file for the platform
fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/ksc/config.toml first, then /etc/ksc/config.toml
        if let Some(user_config) = dirs::config_dir().map(|d| d.join("ksc").join("config.toml")) {
            if user_config.exists() {
                return Ok(user_config);
            }
        }
        let system_config = PathBuf::from("/etc/ksc/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("ksc").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("ksc"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/ksc"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("ksc"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/ksc"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("ksc"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\ksc"))
    } else {
        PathBuf::from("./ksc_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_argument_wins() {
        std::env::set_var(ROOT_ENV_VAR, "/tmp/from-env");
        let resolver = RootFolderResolver::new("test");
        let root = resolver.resolve(Some("/tmp/from-cli"));
        assert_eq!(root, PathBuf::from("/tmp/from-cli"));
        std::env::remove_var(ROOT_ENV_VAR);
    }

    #[test]
    #[serial]
    fn env_var_beats_default() {
        std::env::set_var(ROOT_ENV_VAR, "/tmp/from-env");
        let resolver = RootFolderResolver::new("test");
        let root = resolver.resolve(None);
        assert_eq!(root, PathBuf::from("/tmp/from-env"));
        std::env::remove_var(ROOT_ENV_VAR);
    }

    #[test]
    #[serial]
    fn port_cli_argument_wins() {
        std::env::set_var(PORT_ENV_VAR, "6000");
        assert_eq!(resolve_port(Some(7000)), 7000);
        std::env::remove_var(PORT_ENV_VAR);
    }

    #[test]
    #[serial]
    fn port_env_var_parsed() {
        std::env::set_var(PORT_ENV_VAR, "6001");
        assert_eq!(resolve_port(None), 6001);
        std::env::remove_var(PORT_ENV_VAR);
    }

    #[test]
    #[serial]
    fn port_falls_back_to_default() {
        std::env::remove_var(PORT_ENV_VAR);
        assert_eq!(resolve_port(None), DEFAULT_PORT);
    }

    #[test]
    fn database_path_inside_root() {
        let init = RootFolderInitializer::new(PathBuf::from("/tmp/ksc-test"));
        assert_eq!(init.database_path(), PathBuf::from("/tmp/ksc-test/ksc.db"));
    }
}
