//! QEMU launcher.

use std::path::PathBuf;

use super::{Launcher, Peripheral, QemuArgs, VmError, VmProcess, ensure_backing_file};
use crate::config::ProjectConfig;
use crate::log;
use crate::utils::exec::{Cmd, StdinPolicy};

/// Launches QEMU for the configured architecture and peripheral.
#[derive(Debug, Clone)]
pub struct Qemu {
    program: String,
    root: PathBuf,
    args: QemuArgs,
}

impl Qemu {
    /// Launcher booting `config.build.kernel_image` with `config.build.initfs`.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let program = config
            .vm
            .qemu
            .clone()
            .unwrap_or_else(|| config.build.arch.qemu_binary().to_owned());
        let args = QemuArgs::from_config(
            config,
            &config.root_join(&config.build.kernel_image),
            &config.root_join(&config.build.initfs),
        );
        Self::new(program, &config.root, args)
    }

    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>, args: QemuArgs) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
            args,
        }
    }

    #[cfg(test)]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[cfg(test)]
    pub fn args(&self) -> &QemuArgs {
        &self.args
    }

    fn command(&self, stdin: StdinPolicy) -> Result<Cmd, VmError> {
        let binary = which::which(&self.program).map_err(|source| VmError::NotFound {
            program: self.program.clone(),
            source,
        })?;
        Ok(Cmd::new(binary)
            .args(self.args.to_args())
            .cwd(&self.root)
            .stdin(stdin))
    }
}

impl Launcher for Qemu {
    type Handle = VmProcess;

    fn launch(&mut self, stdin: StdinPolicy) -> Result<VmProcess, VmError> {
        let cmd = self.command(stdin)?;

        if let Peripheral::Storage { backing_file, size } = &self.args.peripheral {
            ensure_backing_file(backing_file, *size).map_err(|source| VmError::Storage {
                path: backing_file.clone(),
                source,
            })?;
        }

        log!("vm"; "starting {}", self.program);
        let child = cmd.spawn().map_err(|source| VmError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        Ok(VmProcess::new(child))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::config::PeripheralConfig;
    use crate::core::Arch;
    use crate::vm::VmHandle;

    fn config(root: &Path) -> ProjectConfig {
        ProjectConfig {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_binary_follows_arch() {
        let temp = TempDir::new().unwrap();
        let mut config = config(temp.path());

        assert_eq!(Qemu::from_config(&config).program(), "qemu-system-x86_64");

        config.build.arch = Arch::Riscv64;
        assert_eq!(Qemu::from_config(&config).program(), "qemu-system-riscv64");

        config.vm.qemu = Some("/opt/qemu/bin/qemu-system-x86_64".into());
        assert_eq!(
            Qemu::from_config(&config).program(),
            "/opt/qemu/bin/qemu-system-x86_64"
        );
    }

    #[test]
    fn test_boot_files_resolved_against_root() {
        let temp = TempDir::new().unwrap();
        let qemu = Qemu::from_config(&config(temp.path()));

        assert_eq!(qemu.args().boot_image, temp.path().join("ftl.elf"));
        assert_eq!(qemu.args().initfs, temp.path().join("initfs.tar"));
    }

    #[test]
    fn test_missing_binary_is_not_found() {
        let temp = TempDir::new().unwrap();
        let mut config = config(temp.path());
        config.vm.qemu = Some("definitely-not-a-real-qemu-ftl".into());

        let err = Qemu::from_config(&config)
            .launch(StdinPolicy::Null)
            .unwrap_err();

        assert!(matches!(err, VmError::NotFound { .. }));
        assert!(err.is_launch_failure());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_prepares_storage() {
        let temp = TempDir::new().unwrap();
        let disk = temp.path().join("disk.img");
        let mut config = config(temp.path());
        // `true` ignores the QEMU arguments and exits cleanly.
        config.vm.qemu = Some("true".into());
        config.vm.peripheral = PeripheralConfig::Storage {
            path: disk.clone(),
            size: 4096,
        };

        let mut vm = Qemu::from_config(&config).launch(StdinPolicy::Null).unwrap();
        vm.wait().await.unwrap();

        assert_eq!(std::fs::metadata(&disk).unwrap().len(), 4096);
    }
}
