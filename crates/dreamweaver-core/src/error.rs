use thiserror::Error;

/// Top-level error type for DreamWeaver.
///
/// Most of the persistence layer never surfaces errors to callers (reads
/// degrade to "absent", writes are logged and swallowed). This type covers the
/// edges that do propagate: configuration, opening the medium, backup files,
/// CLI input and unwired backend operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DreamweaverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{operation} is not implemented for the {provider} backend")]
    NotImplemented {
        provider: String,
        operation: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for DreamweaverError {
    fn from(err: toml::de::Error) -> Self {
        DreamweaverError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DreamweaverError {
    fn from(err: toml::ser::Error) -> Self {
        DreamweaverError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DreamweaverError {
    fn from(err: serde_json::Error) -> Self {
        DreamweaverError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for DreamWeaver operations.
pub type Result<T> = std::result::Result<T, DreamweaverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DreamweaverError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_not_implemented_display() {
        let err = DreamweaverError::NotImplemented {
            provider: "supabase".to_string(),
            operation: "sync".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sync is not implemented for the supabase backend"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DreamweaverError = io_err.into();
        assert!(matches!(err, DreamweaverError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: DreamweaverError = err.unwrap_err().into();
        assert!(matches!(err, DreamweaverError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: DreamweaverError = err.unwrap_err().into();
        assert!(matches!(err, DreamweaverError::Serialization(_)));
    }

    #[test]
    fn test_display_all_variants() {
        let cases: Vec<(DreamweaverError, &str)> = vec![
            (
                DreamweaverError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                DreamweaverError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
            (
                DreamweaverError::Import("bad document".to_string()),
                "Import error: bad document",
            ),
            (
                DreamweaverError::InvalidInput("end before start".to_string()),
                "Invalid input: end before start",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
