//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed config file")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_messages_name_the_problem() {
        let err = ConfigError::Io(
            PathBuf::from("other.toml"),
            Error::new(ErrorKind::NotFound, "config file not found"),
        );
        assert_eq!(err.to_string(), "cannot read config file `other.toml`");

        let err = ConfigError::Validation("build.apps must not be empty".to_string());
        assert_eq!(err.to_string(), "invalid config: build.apps must not be empty");
    }
}
