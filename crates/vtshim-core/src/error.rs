//! Error types for shim operations

use thiserror::Error;

/// Errors a shim accessor can report
///
/// Everything else (dangling pointers, mismatched allocator pairs, callbacks
/// with the wrong signature) is a contract violation and is not detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShimError {
    #[error("buffer holds {capacity} code points, {required} required")]
    BufferTooSmall { capacity: usize, required: usize },

    #[error("failed to allocate {size} bytes for a screen cell")]
    AllocFailed { size: usize },
}

pub type Result<T> = std::result::Result<T, ShimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ShimError::BufferTooSmall {
            capacity: 2,
            required: 6,
        };
        assert_eq!(err.to_string(), "buffer holds 2 code points, 6 required");

        let err = ShimError::AllocFailed { size: 40 };
        let message = err.to_string();
        assert_eq!(message, "failed to allocate 40 bytes for a screen cell");
    }
}
