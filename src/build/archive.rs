//! initfs packaging.
//!
//! The package is a plain tar stream with one regular file per app. Headers
//! are normalized (mtime, owner, mode) so the same inputs in the same order
//! always produce the same bytes.

use std::fs;
use std::path::Path;

use tar::{Builder, EntryType, Header};

use super::ArchiveError;
use crate::utils::path::write_atomic;

/// Permission bits recorded for every entry.
const ENTRY_MODE: u32 = 0o644;

/// Ordered name → contents mapping, fully loaded in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    entries: Vec<(String, Vec<u8>)>,
}

impl Archive {
    /// Read every file up front, in the given order.
    ///
    /// Fails on the first unreadable path; nothing is packaged then. A name
    /// given twice keeps its first position and takes the later contents.
    pub fn from_files<'a, I>(files: I) -> Result<Self, ArchiveError>
    where
        I: IntoIterator<Item = (&'a str, &'a Path)>,
    {
        let mut archive = Self::default();
        for (name, path) in files {
            let data = fs::read(path).map_err(|source| ArchiveError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            archive.insert(name, data);
        }
        Ok(archive)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = data,
            None => self.entries.push((name.to_owned(), data)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Encode as a tar stream.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut builder = Builder::new(Vec::new());

        for (name, data) in &self.entries {
            let mut header = Header::new_gnu();
            header.set_entry_type(EntryType::Regular);
            header.set_size(data.len() as u64);
            header.set_mode(ENTRY_MODE);
            header.set_mtime(0);
            header.set_uid(0);
            header.set_gid(0);

            builder
                .append_data(&mut header, name, data.as_slice())
                .map_err(|source| ArchiveError::Encode {
                    name: name.clone(),
                    source,
                })?;
        }

        builder.into_inner().map_err(|source| ArchiveError::Encode {
            name: String::new(),
            source,
        })
    }

    /// Encode and replace `path` in a single rename.
    pub fn write_atomic(&self, path: &Path) -> Result<(), ArchiveError> {
        let bytes = self.to_bytes()?;
        write_atomic(path, &bytes).map_err(|source| ArchiveError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_files(dir: &Path, files: &[(&str, &[u8])]) -> Vec<(String, PathBuf)> {
        files
            .iter()
            .map(|(name, data)| {
                let path = dir.join(format!("{name}.elf"));
                fs::write(&path, data).unwrap();
                ((*name).to_owned(), path)
            })
            .collect()
    }

    fn read_back(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = tar::Archive::new(bytes);
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let name = entry.path().unwrap().to_string_lossy().into_owned();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                (name, data)
            })
            .collect()
    }

    #[test]
    fn test_entries_match_file_contents() {
        let temp = TempDir::new().unwrap();
        let files = write_files(
            temp.path(),
            &[("tcpip", b"\x7fELF tcpip"), ("http_server", b"\x7fELF http"), ("empty", b"")],
        );

        let archive =
            Archive::from_files(files.iter().map(|(n, p)| (n.as_str(), p.as_path()))).unwrap();
        let entries = read_back(&archive.to_bytes().unwrap());

        assert_eq!(
            entries,
            vec![
                ("tcpip".to_owned(), b"\x7fELF tcpip".to_vec()),
                ("http_server".to_owned(), b"\x7fELF http".to_vec()),
                ("empty".to_owned(), Vec::new()),
            ]
        );
    }

    #[test]
    fn test_same_input_same_bytes() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &[("a", b"alpha"), ("b", b"beta")]);
        let pack = || {
            Archive::from_files(files.iter().map(|(n, p)| (n.as_str(), p.as_path())))
                .unwrap()
                .to_bytes()
                .unwrap()
        };

        let first = pack();
        // Touch the files: mtimes must not leak into the package
        for (_, path) in &files {
            let data = fs::read(path).unwrap();
            fs::write(path, data).unwrap();
        }
        assert_eq!(first, pack());
    }

    #[test]
    fn test_order_follows_input() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &[("a", b"alpha"), ("b", b"beta")]);

        let forward =
            Archive::from_files(files.iter().map(|(n, p)| (n.as_str(), p.as_path()))).unwrap();
        let reverse =
            Archive::from_files(files.iter().rev().map(|(n, p)| (n.as_str(), p.as_path())))
                .unwrap();

        assert_eq!(forward.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(reverse.names().collect::<Vec<_>>(), ["b", "a"]);
        // Same key set and contents either way
        for name in ["a", "b"] {
            assert_eq!(forward.get(name), reverse.get(name));
        }
    }

    #[test]
    fn test_duplicate_name_single_entry() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &[("hello", b"v1"), ("ping", b"pong")]);
        let second = temp.path().join("hello-v2.elf");
        fs::write(&second, b"v2").unwrap();

        let archive = Archive::from_files([
            ("hello", files[0].1.as_path()),
            ("ping", files[1].1.as_path()),
            ("hello", second.as_path()),
        ])
        .unwrap();

        assert_eq!(archive.len(), 2);
        assert_eq!(archive.names().collect::<Vec<_>>(), ["hello", "ping"]);
        assert_eq!(archive.get("hello"), Some(&b"v2"[..]));
    }

    #[test]
    fn test_unreadable_input_fails() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &[("ok", b"data")]);
        let missing = temp.path().join("missing.elf");

        let err =
            Archive::from_files([("ok", files[0].1.as_path()), ("missing", missing.as_path())])
                .unwrap_err();

        match err {
            ArchiveError::Read { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_atomic_persists_package() {
        let temp = TempDir::new().unwrap();
        let mut archive = Archive::default();
        archive.insert("hello", b"hi".to_vec());

        let out = temp.path().join("initfs.tar");
        archive.write_atomic(&out).unwrap();

        let entries = read_back(&fs::read(&out).unwrap());
        assert_eq!(entries, vec![("hello".to_owned(), b"hi".to_vec())]);
    }
}
