// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for emulator operations.

use rustix::io::Errno;
use thiserror::Error;

/// Result type alias for emulator operations.
pub type Result<T> = std::result::Result<T, ShimError>;

/// Errors the emulator reports to its caller.
///
/// Everything here is scoped to one request/response exchange. The one
/// fatal condition — an unknown GPU name at selection time — is only
/// escalated by [`crate::select_or_abort`]; as an error value it is as
/// recoverable as the rest.
#[derive(Debug, Error)]
pub enum ShimError {
    /// The requested GPU profile name matches nothing in the table.
    #[error("no GPU profile named \"{name}\"")]
    UnknownGpu {
        /// The name that failed to match.
        name: String,
    },

    /// The request code is not part of the modeled control surface.
    #[error("invalid request code {code:#04x}")]
    InvalidRequest {
        /// The rejected code.
        code: u32,
    },

    /// The info-query kind is not part of the modeled query surface.
    #[error("invalid info query {query:#04x}")]
    InvalidQuery {
        /// The rejected query code.
        query: u32,
    },

    /// The buffer-object store could not satisfy an allocation.
    #[error("buffer allocation failed: {source}")]
    Allocation {
        /// OS error from the backing store.
        #[from]
        source: Errno,
    },
}

impl ShimError {
    /// Create an unknown-GPU error.
    pub fn unknown_gpu(name: impl Into<String>) -> Self {
        Self::UnknownGpu { name: name.into() }
    }

    /// Create an invalid-request error.
    #[must_use]
    pub const fn invalid_request(code: u32) -> Self {
        Self::InvalidRequest { code }
    }

    /// Create an invalid-query error.
    #[must_use]
    pub const fn invalid_query(query: u32) -> Self {
        Self::InvalidQuery { query }
    }

    /// The errno this error maps to at the character-device boundary.
    #[must_use]
    pub fn errno(&self) -> Errno {
        match self {
            Self::UnknownGpu { .. } => Errno::NODEV,
            Self::InvalidRequest { .. } | Self::InvalidQuery { .. } => Errno::INVAL,
            Self::Allocation { source } => *source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_requests_map_to_einval() {
        assert_eq!(ShimError::invalid_request(0x42).errno(), Errno::INVAL);
        assert_eq!(ShimError::invalid_query(0x7).errno(), Errno::INVAL);
    }

    #[test]
    fn allocation_errors_keep_their_errno() {
        let err = ShimError::from(Errno::NOMEM);
        assert_eq!(err.errno(), Errno::NOMEM);
    }

    #[test]
    fn unknown_gpu_names_the_miss() {
        let err = ShimError::unknown_gpu("fiji");
        assert_eq!(err.to_string(), "no GPU profile named \"fiji\"");
    }
}
