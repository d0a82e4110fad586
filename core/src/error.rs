use crate::encryption::EncryptionScheme;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed encryption for {scheme}: {reason}")]
    MalformedEncryption {
        scheme: EncryptionScheme,
        reason: String,
    },

    #[error("Invalid argument type for {argument}: {reason}")]
    InvalidArgumentType {
        argument: &'static str,
        reason: String,
    },

    #[error("borg exited with {}: {stderr}", exit_code_label(.code))]
    ExternalToolFailure { code: Option<i32>, stderr: String },
}

impl Error {
    /// True when the error was raised before any external process was spawned.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MalformedEncryption { .. } | Error::InvalidArgumentType { .. }
        )
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_failure_message_keeps_stderr() {
        let err = Error::ExternalToolFailure {
            code: Some(2),
            stderr: "Repository /tmp/foo already exists.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "borg exited with status 2: Repository /tmp/foo already exists."
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn test_signal_termination_label() {
        let err = Error::ExternalToolFailure {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_validation_classification() {
        let err = Error::MalformedEncryption {
            scheme: EncryptionScheme::Repokey,
            reason: "passphrase required".to_string(),
        };
        assert!(err.is_validation());

        let err = Error::InvalidArgumentType {
            argument: "name",
            reason: "contains a NUL byte".to_string(),
        };
        assert!(err.is_validation());
    }
}
