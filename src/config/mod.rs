//! Project configuration from the optional `ftl.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── vm         # [vm], [vm.peripheral]
//! │   └── dev        # [dev]
//! ├── error          # ConfigError
//! ├── util           # config file discovery
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! Without a config file every section takes its defaults and the project
//! root is the working directory.

pub mod section;
mod error;
mod util;

pub use error::ConfigError;
pub use section::{BuildSectionConfig, DevConfig, PeripheralConfig, VmConfig};

use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// Default config file name searched for from the working directory upward.
pub const DEFAULT_CONFIG: &str = "ftl.toml";

/// Root configuration structure representing ftl.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Config file the values came from, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// What to build
    pub build: BuildSectionConfig,

    /// How to launch the VM
    pub vm: VmConfig,

    /// Watch settings for `ftl dev`
    pub dev: DevConfig,
}

impl ProjectConfig {
    /// Load configuration for the CLI invocation.
    ///
    /// A missing `ftl.toml` is fine (defaults apply); a missing file that was
    /// named explicitly with `--config` is an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.clone());
                config.config_path = Some(path);
                config
            }
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                return Err(ConfigError::Io(
                    cli.config.clone(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                )
                .into());
            }
            None => Self::default(),
        };

        if config.root.as_os_str().is_empty() {
            config.root = cwd;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Check every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        self.build.validate(&mut errors);
        self.vm.validate(&mut errors);
        self.dev.validate(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Join a path with the root directory (absolute paths pass through).
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        crate::utils::path::resolve_path(path.as_ref(), &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Arch;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::from_str("").unwrap();
        assert_eq!(config.build.apps, ["virtio_net", "tcpip", "http_server"]);
        assert_eq!(config.build.arch, Arch::X64);
        assert_eq!(config.vm.memory, 128);
        assert_eq!(config.vm.gdb_port, 7778);
        assert_eq!(config.dev.debounce_ms, 5);
        assert!(matches!(
            config.vm.peripheral,
            PeripheralConfig::Network { host_port: 30080, guest_port: 80, .. }
        ));
        config.validate().unwrap();
    }

    #[test]
    fn test_storage_peripheral() {
        let config = ProjectConfig::from_str(
            r#"
            [build]
            apps = ["virtio_blk"]
            arch = "arm64"

            [vm.peripheral]
            kind = "storage"
            size = 1048576
            "#,
        )
        .unwrap();

        assert_eq!(config.build.arch, Arch::Arm64);
        match config.vm.peripheral {
            PeripheralConfig::Storage { size, path } => {
                assert_eq!(size, 1_048_576);
                assert!(path.ends_with("ftl-disk.img"));
            }
            other => panic!("unexpected peripheral: {other:?}"),
        }
    }

    #[test]
    fn test_validation_collects_errors() {
        let config = ProjectConfig::from_str(
            r#"
            [build]
            apps = []
            [vm]
            memory = 0
            [dev]
            debounce_ms = 0
            "#,
        )
        .unwrap();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("build.apps"));
        assert!(err.contains("vm.memory"));
        assert!(err.contains("dev.debounce_ms"));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) = ProjectConfig::parse_with_ignored(
            r#"
            [build]
            apps = ["hello"]
            colour = "blue"
            "#,
        )
        .unwrap();
        assert_eq!(config.build.apps, ["hello"]);
        assert_eq!(ignored, ["build.colour"]);
    }

    #[test]
    fn test_root_join() {
        let config = ProjectConfig {
            root: PathBuf::from("/work/ftl"),
            ..Default::default()
        };
        assert_eq!(config.root_join("initfs.tar"), PathBuf::from("/work/ftl/initfs.tar"));
    }
}
