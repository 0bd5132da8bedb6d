/*============================================================
  Synavera Project: xerr
  Module: xerr::details
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Type-erased container for the machine-readable payload a
    node carries alongside its message.

  Security / Safety Notes:
    Payloads are rendered verbatim; callers decide what is safe
    to attach.

  Dependencies:
    serde / serde_json for the fallible JSON projection.

  Operational Scope:
    Attached at construction, read by rendering and JSON
    conversion.

  Revision History:
    2026-10-15 COD  Introduced Details payload wrapper.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Serialization failures stay local to the payload
    - Shared, immutable payloads across cloned chains
============================================================*/

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

trait Payload: fmt::Debug + Send + Sync {
    fn to_raw_json(&self) -> serde_json::Result<Box<RawValue>>;
    fn to_value(&self) -> serde_json::Result<Value>;
}

struct Serializable<T>(T);

impl<T: fmt::Debug> fmt::Debug for Serializable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> Payload for Serializable<T>
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn to_raw_json(&self) -> serde_json::Result<Box<RawValue>> {
        serde_json::value::to_raw_value(&self.0)
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.0)
    }
}

struct Opaque<T>(T);

impl<T: fmt::Debug> fmt::Debug for Opaque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> Payload for Opaque<T>
where
    T: fmt::Debug + Send + Sync,
{
    fn to_raw_json(&self) -> serde_json::Result<Box<RawValue>> {
        Err(unrepresentable::<T>())
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        Err(unrepresentable::<T>())
    }
}

fn unrepresentable<T>() -> serde_json::Error {
    serde_json::Error::custom(format!("{} has no JSON representation", type_name::<T>()))
}

/// Structured payload attached to an [`ErrorNode`](crate::ErrorNode).
///
/// Cloning shares the payload; nodes never mutate it.
#[derive(Clone)]
pub struct Details(Arc<dyn Payload>);

impl Details {
    /// Wrap a serializable payload.
    pub fn new<T>(payload: T) -> Self
    where
        T: Serialize + fmt::Debug + Send + Sync + 'static,
    {
        Self(Arc::new(Serializable(payload)))
    }

    /// Wrap a payload that can be rendered but never serialized, such as a
    /// live handle. JSON conversion of the owning node emits `null` for it.
    pub fn opaque<T>(payload: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Self(Arc::new(Opaque(payload)))
    }

    /// JSON text of the payload, preserving its own field order.
    pub fn to_json(&self) -> serde_json::Result<Box<RawValue>> {
        self.0.to_raw_json()
    }

    /// Payload as a JSON tree, for serializers other than serde_json.
    /// Object keys come back sorted.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        self.0.to_value()
    }

    /// True when both handles point at the same payload.
    pub fn ptr_eq(&self, other: &Details) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
