//! `.env` file discovery.
//!
//! Credentials usually live in a dotenv-style file rather than the shell
//! environment. The first match wins:
//!
//! 1. `ENV_PATH`, which must point at an existing file when set
//! 2. `.env` in the current directory
//! 3. `.env` in tern's config directory (`~/.config/tern/.env`)
//!
//! Variables already present in the process environment are never overridden.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use super::types::Config;
use crate::constants::{ENV_FILENAME, ENV_PATH_VAR};

/// Pure discovery step, separated from the process environment for testing.
pub(super) fn find_env_file(
    env_path: Option<&str>,
    cwd: &Path,
    config_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(explicit) = env_path.filter(|p| !p.is_empty()) {
        let path = PathBuf::from(explicit);
        if !path.is_file() {
            bail!("{ENV_PATH_VAR} is set to '{explicit}' but file does not exist");
        }
        return Ok(Some(path));
    }

    let local = cwd.join(ENV_FILENAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    if let Some(dir) = config_dir {
        let global = dir.join(ENV_FILENAME);
        if global.is_file() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

impl Config {
    /// Loads the first `.env` file found into the process environment.
    ///
    /// Returns the path that was loaded, if any.
    pub fn load_env_file() -> Result<Option<PathBuf>> {
        let env_path = std::env::var(ENV_PATH_VAR).ok();
        let cwd = std::env::current_dir()?;
        let config_dir = Self::config_dir().ok();

        let Some(path) = find_env_file(env_path.as_deref(), &cwd, config_dir.as_deref())? else {
            tracing::debug!("no .env file found");
            return Ok(None);
        };

        dotenvy::from_path(&path)
            .with_context(|| format!("error loading env file from '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded env file");
        Ok(Some(path))
    }
}
