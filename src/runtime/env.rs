//! Environment, well-known directories and the clock.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn download_dir_impl(&self) -> Option<PathBuf> {
        dirs::download_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn current_dir_impl(&self) -> Result<PathBuf> {
        env::current_dir().context("Failed to get current directory")
    }

    pub(crate) fn now_impl(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_real_runtime_env_and_dirs() {
        let runtime = RealRuntime;

        // PATH exists on every supported system
        assert!(runtime.env_var("PATH").is_ok());
        assert!(runtime.env_var("OPUS_SURELY_UNSET_VARIABLE").is_err());

        let cwd = runtime.current_dir().unwrap();
        assert!(cwd.is_absolute());

        // CI might not have a download directory
        let _ = runtime.download_dir();
    }

    #[test]
    fn test_real_runtime_clock_moves_forward() {
        let runtime = RealRuntime;
        let first = runtime.now();
        let second = runtime.now();
        assert!(second >= first);
    }
}
