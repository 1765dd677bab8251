use crate::error::ErrorCode;
use crate::export::CsvOptions;
use crate::page::DEFAULT_PAGE_SIZE;
use crate::password::PasswordPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "ume.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UmeConfig {
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub password: PasswordPolicy,
    #[serde(default)]
    pub export: CsvOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub include_inactive: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            include_inactive: false,
        }
    }
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE.get()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value in {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl ConfigError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Invalid { .. } => ErrorCode::ConfigInvalid,
        }
    }
}

impl UmeConfig {
    /// Reject values the list engine cannot use.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.list.page_size == 0 {
            return Err("list.page_size must be at least 1".to_string());
        }
        self.password
            .validate()
            .map_err(|e| format!("password.length: {e}"))?;
        self.export
            .delimiter_byte()
            .map_err(|e| format!("export.delimiter: {e}"))?;
        Ok(())
    }
}

/// Load and validate a config file. A missing file yields the defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the file cannot be read, is not valid
/// TOML, or holds out-of-range values.
pub fn load_config(path: &Path) -> Result<UmeConfig, ConfigError> {
    if !path.exists() {
        return Ok(UmeConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = toml::from_str::<UmeConfig>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate().map_err(|message| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    })?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Config path to use: the explicit one, else `./ume.toml` when present,
/// else the per-user file under the platform config dir.
#[must_use]
pub fn config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = cwd.join(PROJECT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir().map(|dir| dir.join("ume").join("config.toml"))
}

/// Resolve and load the effective config.
///
/// # Errors
///
/// See [`load_config`]. An explicitly named file must exist.
pub fn discover_config(explicit: Option<&Path>, cwd: &Path) -> Result<UmeConfig, ConfigError> {
    if let Some(path) = explicit.filter(|p| !p.exists()) {
        return Err(ConfigError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }

    match config_path(explicit, cwd) {
        Some(path) => load_config(&path),
        None => Ok(UmeConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, UmeConfig::default());
        assert_eq!(config.list.page_size, 10);
        assert_eq!(config.password.length, 12);
        assert_eq!(config.export.delimiter, ',');
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "[list]\npage_size = 5\n\n[password]\nsymbols = false\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.list.page_size, 5);
        assert!(!config.list.include_inactive);
        assert_eq!(config.password.length, 12);
        assert!(!config.password.symbols);
        assert!(config.password.digits);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();

        let path = write(&dir, "[list]\npage_size = 0\n");
        let err = load_config(&path).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ConfigInvalid);

        let path = write(&dir, "[password]\nlength = 40\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid { .. })));

        let path = write(&dir, "[export]\ndelimiter = \"\u{e9}\"\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[list\npage_size = ");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.error_code().code(), "E1001");
    }

    #[test]
    fn local_file_wins_over_user_dir() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[list]\ninclude_inactive = true\n");
        assert_eq!(config_path(None, dir.path()), Some(path));
        assert!(discover_config(None, dir.path()).unwrap().list.include_inactive);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("custom.toml");
        let err = discover_config(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
