use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a sampling run.
#[derive(Error, Debug)]
pub enum SampleError {
    /// A strategy parameter was malformed or out of range. Raised before any file I/O.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("source directory unreadable: {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("destination not writable: {}: {source}", path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Only raised under `ExistingPolicy::Refuse`, before anything is copied.
    #[error("destination file already exists: {}", path.display())]
    DestinationExists { path: PathBuf },

    /// A copy failed part-way through the run; `copied` files were already written.
    #[error(
        "failed to copy {} to {}: {source} ({copied} image(s) already copied)",
        from.display(),
        to.display()
    )]
    Copy {
        from: PathBuf,
        to: PathBuf,
        copied: usize,
        #[source]
        source: io::Error,
    },
}

impl SampleError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SampleError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SampleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_error_reports_progress() {
        let err = SampleError::Copy {
            from: PathBuf::from("src/CO_0001.jpg"),
            to: PathBuf::from("out/SM_0001_0003.jpg"),
            copied: 2,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("src/CO_0001.jpg"));
        assert!(msg.contains("2 image(s) already copied"));
    }

    #[test]
    fn test_invalid_parameter_names_parameter() {
        let err = SampleError::invalid("every_nth", "must be at least 1, got 0");
        assert_eq!(
            err.to_string(),
            "invalid parameter `every_nth`: must be at least 1, got 0"
        );
    }
}
