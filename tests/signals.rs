//! Signal handling of the `ftl` binary.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tempfile::TempDir;

fn ftl_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ftl"))
}

/// A project whose toolchain marks that it started, then hangs.
fn slow_project(dir: &Path) -> PathBuf {
    let toolchain = dir.join("slow-cargo");
    fs::write(&toolchain, "#!/bin/sh\ntouch \"$0.started\"\nexec sleep 5\n").unwrap();
    fs::set_permissions(&toolchain, fs::Permissions::from_mode(0o755)).unwrap();
    fs::write(
        dir.join("ftl.toml"),
        format!("[build]\ncargo = \"{}\"\n", toolchain.display()),
    )
    .unwrap();
    dir.join("slow-cargo.started")
}

fn wait_for(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        assert!(start.elapsed() < timeout, "{} never appeared", path.display());
        sleep(Duration::from_millis(20));
    }
}

fn wait_timeout(child: &mut Child, timeout: Duration) -> ExitStatus {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if start.elapsed() > timeout {
            let _ = child.kill();
            panic!("ftl did not exit within {timeout:?}");
        }
        sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_sigterm_during_build_is_handled() {
    let temp = TempDir::new().unwrap();
    let started = slow_project(temp.path());

    let mut child = Command::new(ftl_bin())
        .arg("build")
        .current_dir(temp.path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    wait_for(&started, Duration::from_secs(10));
    kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM).unwrap();

    // Handled like Ctrl+C outside a dev session: exit 130, not death by signal.
    let status = wait_timeout(&mut child, Duration::from_secs(5));
    assert_eq!(status.code(), Some(130));
}
