//! Terminal output: prefixed log lines and dev-loop status lines.
//!
//! - `log!` prints `[module] message` with a colored prefix
//! - `debug!` does the same, only under `--verbose`
//! - `status_*` print a timestamped outcome line after each cycle
//! - `clear_screen` starts a dev cycle on a clean terminal
//!
//! ```ignore
//! log!("build"; "{} ({}, {})", app, arch, mode);
//! status_error("build failed at `tcpip`", "build of `tcpip` failed with exit code 101");
//! ```
//!
//! Toolchain and VM output share the terminal with us, so nothing printed
//! here is ever rewound or overwritten.

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream, Style};
use std::{
    io::{IsTerminal, Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Set by `--verbose`
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let line = format!("{} {message}", prefix(module));
    let mut stdout = stdout().lock();
    writeln!(stdout, "{line}").ok();
    stdout.flush().ok();
}

fn prefix(module: &str) -> String {
    let style = match module {
        "dev" => Style::new().bright_blue(),
        "watch" => Style::new().bright_green(),
        "vm" => Style::new().bright_magenta(),
        "error" => Style::new().bright_red(),
        _ => Style::new().bright_yellow(),
    };
    paint(&format!("[{module}]"), style.bold())
}

/// Apply `style` unless colors are off for stdout (`--color never`, no TTY).
fn paint(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.style(style))
        .to_string()
}

/// Clear the terminal and move the cursor home.
///
/// No-op when stdout is redirected, so logs stay intact in files and CI.
pub fn clear_screen() {
    let mut stdout = stdout();
    if !stdout.is_terminal() {
        return;
    }
    execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0)).ok();
}

// ============================================================================
// Status lines
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Failed,
    Warning,
}

impl Status {
    fn symbol(self) -> String {
        match self {
            Self::Ok => paint("✓", Style::new().green()),
            Self::Failed => paint("✗", Style::new().red()),
            Self::Warning => paint("⚠", Style::new().yellow()),
        }
    }
}

/// `[HH:MM:SS] <symbol> summary`, with `detail` on following lines.
fn status_block(status: Status, summary: &str, detail: &str) -> String {
    let summary = match status {
        Status::Failed => paint(summary, Style::new().red().bold()),
        _ => summary.to_owned(),
    };
    let stamp = paint(&format!("[{}]", utc_clock()), Style::new().dimmed());
    let mut block = format!("{stamp} {} {summary}", status.symbol());
    if !detail.is_empty() {
        block.push('\n');
        block.push_str(detail);
    }
    block
}

fn print_status(status: Status, summary: &str, detail: &str) {
    let mut stdout = stdout().lock();
    writeln!(stdout, "{}", status_block(status, summary, detail)).ok();
    stdout.flush().ok();
}

pub fn status_success(message: &str) {
    print_status(Status::Ok, message, "");
}

/// Red one-line summary, then the full error below it.
pub fn status_error(summary: &str, detail: &str) {
    print_status(Status::Failed, summary, detail);
}

pub fn status_warning(message: &str) {
    print_status(Status::Warning, message, "");
}

/// Current UTC time as HH:MM:SS
fn utc_clock() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_block_layout() {
        owo_colors::set_override(false);

        let block = status_block(Status::Failed, "build failed", "exit code 101");
        let (first, rest) = block.split_once('\n').unwrap();
        assert!(first.ends_with("✗ build failed"));
        assert_eq!(rest, "exit code 101");

        let block = status_block(Status::Ok, "VM launched", "");
        assert!(!block.contains('\n'));
        assert!(block.ends_with("✓ VM launched"));
    }

    #[test]
    fn test_color_override_off_is_plain() {
        owo_colors::set_override(false);
        assert_eq!(prefix("dev"), "[dev]");
        assert_eq!(prefix("error"), "[error]");
        assert!(!status_block(Status::Warning, "VM exited", "").contains('\x1b'));
        assert!(!status_block(Status::Failed, "build failed", "detail").contains('\x1b'));
    }

    #[test]
    fn test_utc_clock_format() {
        let stamp = utc_clock();
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.matches(':').count(), 2);
    }

    #[test]
    fn test_verbose_flag() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
