use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::watch::types::ChangeKind;
use crate::utils::path::normalize_path;

async fn next_matching(watcher: &mut ChangeWatcher, path: &Path) -> ChangeEvent {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), watcher.next_event())
            .await
            .expect("no file event within 5s")
            .unwrap();
        if event.path == path {
            return event;
        }
    }
}

#[tokio::test]
async fn test_reports_writes_under_root() {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    fs::create_dir_all(root.join("kernel/src")).unwrap();

    let mut watcher = ChangeWatcher::start(&root).unwrap();

    let file = root.join("kernel/src/main.rs");
    fs::write(&file, "fn main() {}").unwrap();

    let event = next_matching(&mut watcher, &file).await;
    assert_ne!(event.kind, ChangeKind::Removed);
}

#[tokio::test]
async fn test_reports_removal() {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    let file = root.join("lib.rs");
    fs::write(&file, "").unwrap();

    let mut watcher = ChangeWatcher::start(&root).unwrap();
    fs::remove_file(&file).unwrap();

    loop {
        let event = next_matching(&mut watcher, &file).await;
        if event.kind == ChangeKind::Removed {
            break;
        }
    }
}

#[test]
fn test_start_on_missing_root_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    let err = ChangeWatcher::start(&missing).err().unwrap();
    assert!(matches!(err, WatchError::Notify(_)));
}
