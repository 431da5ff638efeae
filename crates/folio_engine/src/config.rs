use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use folio_base::{ErrorKind, FolioError, FolioResult, err};

/// Configuration for the folio service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Host address the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Load the service configuration from a TOML file.
///
/// A missing file is not an error: the defaults apply. An unreadable or
/// malformed file is.
pub fn load_config(path: &Path) -> FolioResult<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        Box::new(
            FolioError::new(ErrorKind::Io { source: e })
                .context(format!("Failed to read config file {}", path.display())),
        )
    })?;

    let config: Config = toml::from_str(&contents)
        .map_err(|e| err!("Invalid config file {}: {}", path.display(), e))?;

    debug!(host = %config.host, port = config.port, "config loaded");
    Ok(config)
}
