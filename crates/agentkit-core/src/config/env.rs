//! `.env` loading for provider credentials

use std::path::Path;

use super::error::{ConfigError, ConfigResult};

/// Load variables from a `.env` file, overriding values already set
pub fn load_env(path: impl AsRef<Path>) -> ConfigResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    dotenvy::from_path_override(path)
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", path.display(), e)))
}
