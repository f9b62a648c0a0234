//! Error type shared by the mapper front ends

use thiserror::Error;

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Excel error: {0}")]
    Excel(String),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_display_taxonomy() {
        let error = Error::Taxonomy("root must be an object".to_string());
        assert_eq!(format!("{}", error), "Taxonomy error: root must be an object");
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::Excel("save: disk full".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("Excel"));
        assert!(debug.contains("disk full"));
    }

    /// Taxonomy file errors surface as the core error type
    #[test]
    fn test_taxonomy_load_errors() {
        let error = crate::Taxonomy::from_json_str("[]").unwrap_err();
        assert!(matches!(error, Error::Taxonomy(_)));

        let error = crate::Taxonomy::from_json_str("{").unwrap_err();
        assert!(matches!(error, Error::Json(_)));
    }
}
