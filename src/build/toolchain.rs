//! Toolchain invocation.
//!
//! The coordinator only knows about [`Toolchain`]; [`Cargo`] is the real
//! implementation driving `cargo build` with `-Z build-std`.

use std::ffi::OsString;
use std::path::PathBuf;

use super::{BuildError, BuildParams, ProjectLayout, params::KERNEL_ARTIFACT};
use crate::core::BuildMode;
use crate::utils::exec::Cmd;

/// One synchronous toolchain run producing one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Artifact name (app name or `kernel`).
    pub artifact: String,
    pub manifest: PathBuf,
    /// Target descriptor (`*.json`).
    pub target: PathBuf,
    pub mode: BuildMode,
    /// Working directory.
    pub cwd: PathBuf,
    /// Where the produced binary is expected.
    pub output: PathBuf,
}

impl Invocation {
    pub fn app(layout: &ProjectLayout, params: &BuildParams, app: &str) -> Self {
        let target = layout.user_target(params.arch);
        Self {
            artifact: app.to_owned(),
            manifest: layout.app_manifest(app),
            output: layout.output_path(&target, params.mode, app),
            target,
            mode: params.mode,
            cwd: layout.root.clone(),
        }
    }

    pub fn kernel(layout: &ProjectLayout, params: &BuildParams) -> Self {
        let target = layout.kernel_target(params.arch);
        Self {
            artifact: KERNEL_ARTIFACT.to_owned(),
            manifest: layout.kernel_manifest(),
            output: layout.output_path(&target, params.mode, KERNEL_ARTIFACT),
            target,
            mode: params.mode,
            cwd: layout.root.clone(),
        }
    }
}

/// Something that turns an [`Invocation`] into a binary at `invocation.output`.
pub trait Toolchain {
    /// Run to completion. Non-zero exit must map to [`BuildError::Failed`].
    fn compile(&self, invocation: &Invocation) -> Result<(), BuildError>;
}

/// `cargo build` for freestanding targets.
#[derive(Debug, Clone)]
pub struct Cargo {
    program: String,
}

impl Cargo {
    /// Flags needed to build `core`/`alloc` for a custom target.
    const BUILD_STD: [&'static str; 4] = [
        "-Z",
        "build-std=core,alloc",
        "-Z",
        "build-std-features=compiler-builtins-mem",
    ];

    /// Environment forcing colored, link-free output on the inherited terminal.
    const ENV: [(&'static str, &'static str); 2] =
        [("CARGO_TERM_COLOR", "always"), ("CARGO_TERM_HYPERLINKS", "false")];

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Full argument list for one invocation.
    pub fn args(invocation: &Invocation) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["build".into()];
        args.extend(Self::BUILD_STD.into_iter().map(OsString::from));
        args.push("--manifest-path".into());
        args.push(invocation.manifest.clone().into_os_string());
        args.push("--target".into());
        args.push(invocation.target.clone().into_os_string());
        if let Some(flag) = invocation.mode.cargo_flag() {
            args.push(flag.into());
        }
        args
    }

    fn command(&self, invocation: &Invocation) -> Cmd {
        Cmd::new(&self.program)
            .args(Self::args(invocation))
            .cwd(&invocation.cwd)
            .envs(Self::ENV)
    }
}

impl Default for Cargo {
    fn default() -> Self {
        Self::new("cargo")
    }
}

impl Toolchain for Cargo {
    fn compile(&self, invocation: &Invocation) -> Result<(), BuildError> {
        let status = self
            .command(invocation)
            .status()
            .map_err(|source| BuildError::Spawn {
                artifact: invocation.artifact.clone(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::Failed {
                artifact: invocation.artifact.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Arch;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_app_invocation() {
        let layout = ProjectLayout::with_root("/ftl");
        let params = BuildParams::new(BuildMode::Debug, Arch::X64, ["tcpip"]).unwrap();
        let inv = Invocation::app(&layout, &params, "tcpip");

        assert_eq!(inv.manifest, PathBuf::from("/ftl/apps/tcpip/Cargo.toml"));
        assert_eq!(inv.output, PathBuf::from("/ftl/target/user/debug/tcpip"));
        assert_eq!(inv.cwd, PathBuf::from("/ftl"));
        assert_eq!(
            strings(Cargo::args(&inv)),
            [
                "build",
                "-Z",
                "build-std=core,alloc",
                "-Z",
                "build-std-features=compiler-builtins-mem",
                "--manifest-path",
                "/ftl/apps/tcpip/Cargo.toml",
                "--target",
                "/ftl/libs/rust/ftl/src/arch/x64/user.json",
            ]
        );
    }

    #[test]
    fn test_release_adds_flag() {
        let layout = ProjectLayout::with_root("/ftl");
        let params = BuildParams::new(BuildMode::Release, Arch::X64, ["tcpip"]).unwrap();
        let inv = Invocation::kernel(&layout, &params);

        assert_eq!(inv.artifact, "kernel");
        assert_eq!(inv.output, PathBuf::from("/ftl/target/kernel/release/kernel"));
        assert_eq!(strings(Cargo::args(&inv)).last().map(String::as_str), Some("--release"));
    }

    #[test]
    fn test_missing_toolchain_is_spawn_error() {
        let layout = ProjectLayout::with_root(std::env::temp_dir());
        let params = BuildParams::new(BuildMode::Debug, Arch::X64, ["hello"]).unwrap();
        let inv = Invocation::app(&layout, &params, "hello");

        let err = Cargo::new("definitely-not-a-real-cargo-ftl")
            .compile(&inv)
            .unwrap_err();
        assert!(matches!(err, BuildError::Spawn { ref artifact, .. } if artifact == "hello"));
    }
}
