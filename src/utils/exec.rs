//! External command execution utilities.
//!
//! Provides a Builder-based API shared by the toolchain (blocking, inherited
//! stdio) and the VM supervisor (async child process).
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Blocking run, output goes straight to the terminal
//! let status = Cmd::new("cargo")
//!     .args(["build", "--manifest-path", "kernel/Cargo.toml"])
//!     .cwd(root)
//!     .status()?;
//!
//! // Long-running child without stdin
//! let child = Cmd::new("qemu-system-x86_64")
//!     .args(qemu_args)
//!     .stdin(StdinPolicy::Null)
//!     .spawn()?;
//! ```

use std::{
    ffi::{OsStr, OsString},
    io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

/// Whether a child process may read the host terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdinPolicy {
    /// Share the host's stdin (interactive `run`).
    #[default]
    Inherit,
    /// No stdin, the host keeps the terminal (`dev`).
    Null,
}

impl StdinPolicy {
    fn to_stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
        }
    }
}

/// Command builder for external process execution.
///
/// stdout and stderr are always inherited so the operator sees toolchain and
/// VM output live.
#[derive(Debug, Default, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    stdin: StdinPolicy,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Choose how stdin is wired.
    pub fn stdin(mut self, policy: StdinPolicy) -> Self {
        self.stdin = policy;
        self
    }

    /// Program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Argument list as passed to the process.
    #[cfg(test)]
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Run to completion, blocking the calling thread.
    pub fn status(&self) -> io::Result<ExitStatus> {
        crate::debug!("exec"; "{}", self.display());
        self.std_command().status()
    }

    /// Spawn as a tokio child process.
    pub fn spawn(&self) -> io::Result<tokio::process::Child> {
        crate::debug!("exec"; "{}", self.display());
        tokio::process::Command::from(self.std_command()).spawn()
    }

    fn std_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().cloned())
            .stdin(self.stdin.to_stdio())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Render as a shell-like line for `--verbose` output.
    pub fn display(&self) -> String {
        let mut line = self.program_name();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Describe an exit status for humans: `code 101` or `signal`.
pub fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args_skipped() {
        let cmd = Cmd::new("cargo").args(["build", ""]).args(["", "--release"]);
        assert_eq!(cmd.get_args(), &[OsString::from("build"), OsString::from("--release")]);
    }

    #[test]
    fn test_display() {
        let cmd = Cmd::new("cargo").args(["build", "--manifest-path", "apps/hello/Cargo.toml"]);
        assert_eq!(cmd.display(), "cargo build --manifest-path apps/hello/Cargo.toml");
    }

    #[test]
    fn test_describe_exit() {
        assert_eq!(describe_exit(Some(101)), "exit code 101");
        assert_eq!(describe_exit(None), "a signal");
    }

    #[cfg(unix)]
    #[test]
    fn test_status_reports_exit_code() {
        let status = Cmd::new("sh").args(["-c", "exit 3"]).status().unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn test_status_missing_program() {
        let err = Cmd::new("definitely-not-a-real-program-ftl").status().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
