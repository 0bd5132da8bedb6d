/*============================================================
  Synavera Project: xerr
  Module: xerr
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Structured error chains: each node attaches a message,
    code, details, source location, timestamp and stack
    snapshot to an underlying error, and owns its causal
    predecessor.

  Security / Safety Notes:
    Pure in-process values. Nodes are Send + Sync; callers
    clone before mutating a published chain.

  Dependencies:
    serde/serde_json for the wire form, chrono for stamps,
    thiserror for the crate's own failures.

  Operational Scope:
    Linked into applications that want diagnostics richer
    than opaque error strings.

  Revision History:
    2026-10-15 COD  Established crate layout.
  ------------------------------------------------------------
  SSE Principles Observed:
    - "No error" is a value
    - Render and JSON forms are stable contracts
============================================================*/

pub mod details;
pub mod error;
mod json;
pub mod node;
pub mod timestamp;

pub use details::Details;
pub use error::{PlainError, Result, XerrError};
pub use node::{error_value, Chain, ErrorNode, ErrorValue};
