//! Runtime abstraction for system operations.
//!
//! Everything that touches the process environment, the file system or the
//! wall clock goes through [`Runtime`], so sessions and commands can be
//! tested against a mock.
//!
//! # Structure
//!
//! - `env` - Environment variables, well-known directories and the clock
//! - `fs` - File system operations (read, write, directory)

mod env;
mod fs;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::env as std_env;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    // Directories
    fn download_dir(&self) -> Option<PathBuf>;
    fn current_dir(&self) -> Result<PathBuf>;

    // Clock
    fn now(&self) -> DateTime<Utc>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn download_dir(&self) -> Option<PathBuf> {
        self.download_dir_impl()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn now(&self) -> DateTime<Utc> {
        self.now_impl()
    }
}

/// Directory exports are written to when none is configured: the user's
/// download directory, else the working directory.
pub fn default_out_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    match runtime.download_dir() {
        Some(dir) => Ok(dir),
        None => runtime.current_dir(),
    }
}
