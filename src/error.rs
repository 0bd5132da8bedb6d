/*============================================================
  Synavera Project: xerr
  Module: xerr::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise the crate's own failure taxonomy and the plain
    error value produced when a chain is flattened.

  Security / Safety Notes:
    Messages carry paths and serializer diagnostics only; no
    payload contents are echoed back.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used by JSON conversion to describe encoding failures,
    and by ErrorNode::to_error to flatten chains.

  Revision History:
    2026-10-15 COD  Established xerr error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
============================================================*/

use thiserror::Error;

/// Result alias for xerr operations.
pub type Result<T> = std::result::Result<T, XerrError>;

/// Enumerates failures raised by xerr itself.
#[derive(Debug, Error)]
pub enum XerrError {
    #[error("Marshal: {0}")]
    Marshal(#[from] serde_json::Error),
    #[error("Timestamp {0} is outside the RFC 3339 year range")]
    Timestamp(i64),
}

/// A bare error carrying only its description.
///
/// Every call to [`PlainError::new`] yields a distinct value; once placed
/// behind an [`ErrorValue`](crate::ErrorValue) its identity is the `Arc`
/// allocation, not the text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PlainError(String);

impl PlainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}
