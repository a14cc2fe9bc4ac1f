//! Structured error types for Tagsheet.
//!
//! The layout core never fails: bad input degrades to defaults. Errors only
//! come from the edges, where geometry or settings are encoded as JSON or
//! settings touch the filesystem.

use std::path::PathBuf;

/// The unified error type returned by fallible Tagsheet APIs.
#[derive(Debug, thiserror::Error)]
pub enum TagsheetError {
    /// Layout geometry or a settings blob could not be encoded.
    #[error("failed to serialize JSON: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A settings file could not be read or written.
    #[error("settings I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A settings store rejected a key or could not be located.
    #[error("settings store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn serialization_failures_convert() {
        // serde_json refuses map keys that are not strings.
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1);
        let err: TagsheetError = serde_json::to_string(&map).unwrap_err().into();
        assert!(matches!(err, TagsheetError::Serialize(_)));
        assert!(err.to_string().starts_with("failed to serialize JSON"));
    }

    #[test]
    fn io_error_names_the_path() {
        let err = TagsheetError::Io {
            path: PathBuf::from("/tmp/settings.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "settings I/O failed for /tmp/settings.json: denied");
    }

    #[test]
    fn store_error_display() {
        let err = TagsheetError::Store("bad key".to_string());
        assert_eq!(err.to_string(), "settings store error: bad key");
    }
}
