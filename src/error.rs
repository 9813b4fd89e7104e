//! Error types for grounded-rag

use thiserror::Error;

/// Result type for grounded-rag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for retrieval engine operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration (e.g. overlap >= chunk size)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Embedding dimension mismatch
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Index artifact missing, or the vector/metadata pair failed verification
    #[error("index not found: {0}")]
    IndexNotFound(String),

    /// Evaluator inputs of differing length
    #[error("length mismatch: {results} result lists vs {ground_truth} ground-truth sets")]
    LengthMismatch {
        /// Number of ranked result lists
        results: usize,
        /// Number of ground-truth sets
        ground_truth: usize,
    },

    /// Embedding provider failure
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_config() {
        let err = Error::InvalidConfig("overlap must be less than chunk size".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: overlap must be less than chunk size"
        );
    }

    #[test]
    fn test_error_display_dimension_mismatch() {
        let err = Error::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert_eq!(
            err.to_string(),
            "embedding dimension mismatch: expected 384, got 768"
        );
    }

    #[test]
    fn test_error_display_length_mismatch() {
        let err = Error::LengthMismatch {
            results: 3,
            ground_truth: 2,
        };
        assert_eq!(
            err.to_string(),
            "length mismatch: 3 result lists vs 2 ground-truth sets"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_type() {
        fn may_fail(succeed: bool) -> Result<i32> {
            if succeed {
                Ok(42)
            } else {
                Err(Error::InvalidConfig("test".to_string()))
            }
        }

        assert_eq!(may_fail(true).unwrap(), 42);
        assert!(may_fail(false).is_err());
    }
}
