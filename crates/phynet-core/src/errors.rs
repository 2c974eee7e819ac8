//! Structured error types shared across phynet crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`PhyError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, sizes, indices).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the phynet engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PhyError {
    /// Filesystem and stream errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Malformed binary or text payloads.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// Invalid run configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Dimension mismatches between datasets, states and networks.
    #[error("shape error: {0}")]
    Shape(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Numerical routines that could not produce a result.
    #[error("numeric error: {0}")]
    Numeric(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl PhyError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PhyError::Io(info)
            | PhyError::Format(info)
            | PhyError::Config(info)
            | PhyError::Shape(info)
            | PhyError::Serde(info)
            | PhyError::Numeric(info) => info,
        }
    }

    /// Wraps a [`std::io::Error`] raised while touching `path`.
    pub fn io(code: &str, path: &std::path::Path, err: impl ToString) -> Self {
        PhyError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }

    /// Builds a shape mismatch error carrying the expected and observed sizes.
    pub fn shape(code: &str, message: impl Into<String>, expected: usize, found: usize) -> Self {
        PhyError::Shape(
            ErrorInfo::new(code, message)
                .with_context("expected", expected.to_string())
                .with_context("found", found.to_string()),
        )
    }
}
