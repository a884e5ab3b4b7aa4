//! Common error types and utilities used across all advscope crates.
//!
//! This module provides the top-level error enum that can wrap all sub-errors,
//! along with error classification, severity levels, and utility traits.

use core::fmt;

use crate::{AssertionFailure, CatalogError, ScanError, ScheduleError, ValidationError};

/// Top-level error type that can wrap all advscope sub-errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AdvScopeError {
    /// Scanner and orchestration errors
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Catalog, template and payload errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Schedule verdict failures
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// High-level assertion failures
    #[error("Assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl AdvScopeError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdvScopeError::Scan(_) => ErrorCategory::Scan,
            AdvScopeError::Catalog(_) => ErrorCategory::Catalog,
            AdvScopeError::Schedule(_) => ErrorCategory::Schedule,
            AdvScopeError::Assertion(_) => ErrorCategory::Assertion,
            AdvScopeError::Validation(_) => ErrorCategory::Validation,
            AdvScopeError::Config(_) => ErrorCategory::Config,
            AdvScopeError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdvScopeError::Scan(e) => e.severity(),
            AdvScopeError::Catalog(e) => e.severity(),
            AdvScopeError::Schedule(_) => ErrorSeverity::Error,
            AdvScopeError::Assertion(_) => ErrorSeverity::Error,
            AdvScopeError::Validation(e) => e.severity(),
            AdvScopeError::Config(_) => ErrorSeverity::Error,
            AdvScopeError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check whether this is a verdict (the DUT misbehaved) rather than a
    /// problem with the harness or its inputs.
    pub fn is_verdict(&self) -> bool {
        matches!(
            self,
            AdvScopeError::Schedule(_) | AdvScopeError::Assertion(_)
        )
    }

    /// Check whether the scan saw nothing from a requested address.
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, AdvScopeError::Scan(ScanError::DeviceNotFound { .. }))
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        AdvScopeError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        AdvScopeError::Other(msg.into())
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Scanner and orchestration errors
    Scan = 0,
    /// Catalog errors
    Catalog = 1,
    /// Schedule verdicts
    Schedule = 2,
    /// Assertion failures
    Assertion = 3,
    /// Validation errors
    Validation = 4,
    /// Configuration errors
    Config = 5,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Scan => write!(f, "Scan"),
            ErrorCategory::Catalog => write!(f, "Catalog"),
            ErrorCategory::Schedule => write!(f, "Schedule"),
            ErrorCategory::Assertion => write!(f, "Assertion"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the harness cannot continue
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Context information for errors.
///
/// Records the operation that failed plus key-value details, so that a
/// collaborator failure surfacing from deep inside an assertion still says
/// which check was running.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The operation that was being performed
    pub operation: String,
    /// Additional context key-value pairs
    pub context: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            context: Vec::new(),
        }
    }

    /// Add a context key-value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation: {}", self.operation)?;
        for (key, value) in &self.context {
            write!(f, ", {key}: {value}")?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors.
///
/// Scan errors keep their variant so callers can still match on
/// [`ScanError::DeviceNotFound`]; everything else is flattened into
/// [`AdvScopeError::Other`] with the context prepended.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, ctx: ErrorContext) -> Result<T, AdvScopeError>;

    /// Add context with an operation name.
    fn with_context(self, operation: impl Into<String>) -> Result<T, AdvScopeError>;
}

impl<T, E: Into<AdvScopeError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, ctx: ErrorContext) -> Result<T, AdvScopeError> {
        self.map_err(|e| {
            let err: AdvScopeError = e.into();
            if err.is_device_not_found() || err.is_verdict() {
                err
            } else {
                AdvScopeError::Other(format!("{ctx}: {err}"))
            }
        })
    }

    fn with_context(self, operation: impl Into<String>) -> Result<T, AdvScopeError> {
        self.context(ErrorContext::new(operation))
    }
}
