// ABOUTME: Error types for the cuescrape engine including ErrorCode enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

use crate::dom::DomError;

/// Error codes representing different categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid configuration or selector, detected at construction.
    Config,
    /// Invalid record data, e.g. an empty title.
    Record,
    /// A fault raised by the DOM query interface.
    Dom,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Config => "configuration error",
            ErrorCode::Record => "record validation error",
            ErrorCode::Dom => "dom error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for extraction operations.
///
/// Nothing inside the engine treats one of these as globally fatal: configuration
/// errors abort only the construction call that produced them, record errors skip
/// the offending element, and DOM faults are converted into failure results at
/// the strategy boundary.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub op: String,
    pub detail: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cuescrape: {} {}: {}", self.op, self.code, self.detail)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    /// Create a Config error.
    pub fn config(op: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Config,
            op: op.into(),
            detail: detail.into(),
            source: None,
        }
    }

    /// Create a Record error.
    pub fn record(op: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Record,
            op: op.into(),
            detail: detail.into(),
            source: None,
        }
    }

    /// Create a Dom error wrapping a fault from the DOM query interface.
    pub fn dom(op: impl Into<String>, source: DomError) -> Self {
        Self {
            code: ErrorCode::Dom,
            op: op.into(),
            detail: source.to_string(),
            source: Some(anyhow::Error::new(source)),
        }
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is a Record error.
    pub fn is_record(&self) -> bool {
        self.code == ErrorCode::Record
    }

    /// Returns true if this is a Dom error.
    pub fn is_dom(&self) -> bool {
        self.code == ErrorCode::Dom
    }
}
