//! # Error Handling
//!
//! A single error type covers everything that can go wrong around the flip
//! protocol. The protocol itself has no recoverable failures: once a surface
//! exists, locking and signalling are infallible and a stalled display simply
//! blocks the producer. Errors therefore only arise at the edges:
//!
//! - **Configuration**: rejected before any resource is touched
//! - **Resource allocation**: fatal, aborts surface creation
//! - **Frame validation**: a pixel buffer of the wrong size is refused before
//!   the protocol is entered, leaving all state untouched
//! - **Backend I/O**: the software display's backing storage
//!
//! ## Usage
//!
//! ```rust
//! use pageflip::error::{ErrorSeverity, FlipError};
//!
//! let error = FlipError::config("page_count", "0", "must be at least 1");
//! assert_eq!(error.severity(), ErrorSeverity::Error);
//! assert!(!error.is_fatal());
//! ```

use thiserror::Error;

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// The call was refused but nothing changed; the caller may try again
    Warning,
    /// The operation failed; existing surfaces are unaffected
    Error,
    /// The display stack cannot continue
    Fatal,
}

/// Base error type for the page-flip library
#[derive(Debug, Error)]
pub enum FlipError {
    /// Configuration validation errors
    #[error("invalid configuration: {field} = {value}: {reason}")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
    /// Off-screen resource allocation failed while configuring a surface
    #[error("failed to allocate resource for page {page}: {reason}")]
    ResourceAllocation { page: usize, reason: String },
    /// A submitted pixel buffer does not match the surface geometry
    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },
    /// The backend was handed a resource it does not know about
    #[error("unknown display resource {handle}")]
    UnknownResource { handle: u32 },
    /// The driver was asked to present before a surface was configured
    #[error("no surface configured")]
    NotConfigured,
    /// I/O errors from resource backing storage
    #[error("I/O error during {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl FlipError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a resource allocation error
    pub fn resource(page: usize, reason: impl Into<String>) -> Self {
        Self::ResourceAllocation {
            page,
            reason: reason.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "config",
            Self::ResourceAllocation { .. } => "resource",
            Self::FrameSize { .. } => "frame",
            Self::UnknownResource { .. } => "backend",
            Self::NotConfigured => "state",
            Self::Io { .. } => "io",
        }
    }

    /// Severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::FrameSize { .. } | Self::NotConfigured => ErrorSeverity::Warning,
            Self::InvalidConfig { .. } | Self::UnknownResource { .. } => ErrorSeverity::Error,
            Self::ResourceAllocation { .. } | Self::Io { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Whether the display stack can keep going after this error
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FlipError>;
