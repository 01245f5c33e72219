use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::utils::exec::describe_exit;

/// Failure while reading, encoding or persisting the initfs package.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to read `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode entry `{name}`")]
    Encode {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write `{}`", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure of one build pass. Every variant aborts the pass.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no apps to build")]
    NoApps,

    #[error("failed to start the toolchain for `{artifact}`")]
    Spawn {
        artifact: String,
        #[source]
        source: io::Error,
    },

    #[error("build of `{artifact}` failed with {}", describe_exit(*.code))]
    Failed { artifact: String, code: Option<i32> },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("failed to copy `{}` to `{}`", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Artifact whose toolchain run failed, if that is what went wrong.
    pub fn artifact(&self) -> Option<&str> {
        match self {
            Self::Spawn { artifact, .. } | Self::Failed { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}
