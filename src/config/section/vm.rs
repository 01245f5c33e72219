//! `[vm]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [vm]
//! memory = 128
//! gdb_port = 7778
//!
//! [vm.peripheral]
//! kind = "storage"
//! path = "/tmp/ftl-disk.img"
//! size = 67108864
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// QEMU launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Emulator binary; derived from `build.arch` when unset.
    pub qemu: Option<String>,
    /// Guest memory in MiB.
    pub memory: u32,
    /// `-cpu` model and feature flags.
    pub cpu: String,
    /// GDB stub TCP port.
    pub gdb_port: u16,
    /// `-d` log item filter.
    pub log_filter: String,
    /// `-D` log destination.
    pub log_file: PathBuf,
    /// Device attached to the guest.
    pub peripheral: PeripheralConfig,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            qemu: None,
            memory: 128,
            cpu: "qemu64,+fsgsbase".into(),
            gdb_port: 7778,
            log_filter: "cpu_reset,unimp,guest_errors,int".into(),
            log_file: "qemu.log".into(),
            peripheral: PeripheralConfig::default(),
        }
    }
}

/// Network card forwarded to a host port, or a block device on a backing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PeripheralConfig {
    Network {
        #[serde(default = "default_host_port")]
        host_port: u16,
        #[serde(default = "default_guest_port")]
        guest_port: u16,
        /// Packet capture file; `None` disables the dump filter.
        #[serde(default = "default_pcap")]
        pcap: Option<PathBuf>,
    },
    Storage {
        #[serde(default = "default_disk_path")]
        path: PathBuf,
        /// Backing file size in bytes.
        #[serde(default = "default_disk_size")]
        size: u64,
    },
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self::Network {
            host_port: default_host_port(),
            guest_port: default_guest_port(),
            pcap: default_pcap(),
        }
    }
}

fn default_host_port() -> u16 {
    30080
}

fn default_guest_port() -> u16 {
    80
}

fn default_pcap() -> Option<PathBuf> {
    Some("network.pcap".into())
}

fn default_disk_path() -> PathBuf {
    std::env::temp_dir().join("ftl-disk.img")
}

fn default_disk_size() -> u64 {
    64 * 1024 * 1024
}

impl VmConfig {
    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        if self.memory == 0 {
            errors.push("vm.memory must be greater than 0".into());
        }
        if let PeripheralConfig::Storage { size: 0, .. } = self.peripheral {
            errors.push("vm.peripheral.size must be greater than 0".into());
        }
    }
}
