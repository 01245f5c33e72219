//! Build mode and target architecture.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compilation profile passed to the toolchain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Debug,
    Release,
}

impl BuildMode {
    /// Environment variable selecting release builds.
    pub const ENV_VAR: &'static str = "FTL_RELEASE";

    /// Read the mode from `FTL_RELEASE`.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(Self::ENV_VAR).ok().as_deref())
    }

    /// Any value other than empty, `0` or `false` selects release.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("" | "0") => Self::Debug,
            Some(v) if v.eq_ignore_ascii_case("false") => Self::Debug,
            Some(_) => Self::Release,
        }
    }

    /// Profile directory name under `target/<triple>/`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    /// Extra toolchain flag for this mode.
    pub const fn cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target architecture of the kernel and apps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[default]
    X64,
    Arm64,
    Riscv64,
}

impl Arch {
    /// Directory name used for per-arch target descriptors.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
            Self::Riscv64 => "riscv64",
        }
    }

    /// QEMU system emulator for this architecture.
    pub const fn qemu_binary(self) -> &'static str {
        match self {
            Self::X64 => "qemu-system-x86_64",
            Self::Arm64 => "qemu-system-aarch64",
            Self::Riscv64 => "qemu-system-riscv64",
        }
    }

    /// Machine type, if the emulator has no sensible default.
    pub const fn qemu_machine(self) -> Option<&'static str> {
        match self {
            Self::X64 => None,
            Self::Arm64 | Self::Riscv64 => Some("virt"),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
