//! QEMU command line template.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::config::{PeripheralConfig, ProjectConfig, VmConfig};
use crate::core::Arch;

/// Device attached to the guest, with paths already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peripheral {
    /// virtio-net with a host port forward and optional packet capture.
    Network {
        host_port: u16,
        guest_port: u16,
        pcap: Option<PathBuf>,
    },
    /// virtio-blk backed by a raw file that survives relaunches.
    Storage { backing_file: PathBuf, size: u64 },
}

impl Peripheral {
    pub fn from_config(config: &ProjectConfig) -> Self {
        match &config.vm.peripheral {
            PeripheralConfig::Network {
                host_port,
                guest_port,
                pcap,
            } => Self::Network {
                host_port: *host_port,
                guest_port: *guest_port,
                pcap: pcap
                    .as_deref()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(|p| config.root_join(p)),
            },
            PeripheralConfig::Storage { path, size } => Self::Storage {
                backing_file: config.root_join(path),
                size: *size,
            },
        }
    }

    fn push_args(&self, args: &mut Vec<OsString>) {
        match self {
            Self::Network {
                host_port,
                guest_port,
                pcap,
            } => {
                args.push("-netdev".into());
                args.push(
                    format!("user,id=net0,hostfwd=tcp:127.0.0.1:{host_port}-:{guest_port}").into(),
                );
                args.push("-device".into());
                args.push("virtio-net-pci,netdev=net0".into());
                if let Some(pcap) = pcap {
                    args.push("-object".into());
                    args.push(join_os([
                        OsStr::new("filter-dump,id=filter0,netdev=net0,file="),
                        pcap.as_os_str(),
                    ]));
                }
            }
            Self::Storage { backing_file, .. } => {
                args.push("-drive".into());
                args.push(join_os([
                    OsStr::new("file="),
                    backing_file.as_os_str(),
                    OsStr::new(",if=none,format=raw,id=drive0"),
                ]));
                args.push("-device".into());
                args.push("virtio-blk-pci,drive=drive0".into());
            }
        }
    }
}

fn join_os<'a>(parts: impl IntoIterator<Item = &'a OsStr>) -> OsString {
    let mut out = OsString::new();
    for part in parts {
        out.push(part);
    }
    out
}

/// Fixed launch template: everything except the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QemuArgs {
    pub arch: Arch,
    pub memory: u32,
    pub cpu: String,
    pub boot_image: PathBuf,
    pub initfs: PathBuf,
    pub gdb_port: u16,
    pub log_filter: String,
    pub log_file: PathBuf,
    pub peripheral: Peripheral,
}

impl QemuArgs {
    pub fn from_config(config: &ProjectConfig, boot_image: &Path, initfs: &Path) -> Self {
        let VmConfig {
            memory,
            cpu,
            gdb_port,
            log_filter,
            log_file,
            ..
        } = &config.vm;

        Self {
            arch: config.build.arch,
            memory: *memory,
            cpu: cpu.clone(),
            boot_image: boot_image.to_path_buf(),
            initfs: initfs.to_path_buf(),
            gdb_port: *gdb_port,
            log_filter: log_filter.clone(),
            log_file: config.root_join(log_file),
            peripheral: Peripheral::from_config(config),
        }
    }

    /// Render the argument list.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(32);

        if let Some(machine) = self.arch.qemu_machine() {
            args.push("-machine".into());
            args.push(machine.into());
        }

        args.push("-m".into());
        args.push(self.memory.to_string().into());
        args.push("-cpu".into());
        args.push(self.cpu.clone().into());
        args.push("-kernel".into());
        args.push(self.boot_image.clone().into_os_string());
        args.push("-initrd".into());
        args.push(self.initfs.clone().into_os_string());
        args.push("-nographic".into());
        args.push("-serial".into());
        args.push("mon:stdio".into());
        args.push("--no-reboot".into());
        args.push("-gdb".into());
        args.push(format!("tcp::{}", self.gdb_port).into());
        args.push("-d".into());
        args.push(self.log_filter.clone().into());
        args.push("-D".into());
        args.push(self.log_file.clone().into_os_string());

        self.peripheral.push_args(&mut args);
        args
    }
}
