/*============================================================
  Synavera Project: xerr
  Module: xerr::node
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Define ErrorNode, one layer of causal context, together
    with its constructors and the operations that walk the
    owned previous-error chain.

  Security / Safety Notes:
    Stack snapshots and source paths are captured eagerly;
    consumers choose whether to expose them.

  Dependencies:
    std::backtrace and std::panic::Location for capture.

  Operational Scope:
    The public core of the crate. Every other module reads
    nodes built here.

  Revision History:
    2026-10-15 COD  Authored ErrorNode and chain operations.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Owned chains; no aliasing between nodes
    - "No error" is a value, never a panic
    - Deterministic, field-omitting render
============================================================*/

use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::details::Details;
use crate::error::PlainError;
use crate::timestamp;

/// The wrapped causal error of a node. Identity is the allocation.
pub type ErrorValue = Arc<dyn Error + Send + Sync + 'static>;

/// Lift any error into an [`ErrorValue`].
pub fn error_value<E>(err: E) -> ErrorValue
where
    E: Error + Send + Sync + 'static,
{
    Arc::new(err)
}

/// One layer of context in a causal error chain.
///
/// A node with no `value` is the empty sentinel and stands for "no error".
/// `prev` is owned outright: every constructor deep-copies the node it is
/// handed, so no two chains ever share a predecessor.
#[derive(Clone, Default)]
pub struct ErrorNode {
    pub value: Option<ErrorValue>,
    /// Zero means unset.
    pub code: i64,
    pub msg: String,
    pub details: Option<Details>,
    pub file: String,
    pub line: u32,
    /// Microseconds since the Unix epoch; zero means unset.
    pub timestamp: i64,
    pub prev: Option<Box<ErrorNode>>,
    /// Rendered call stack at construction. Serialized only on request.
    pub stack_trace: Vec<u8>,
}

impl ErrorNode {
    /// Build a node attributed to the caller's source location.
    ///
    /// An unset `value` short-circuits to [`ErrorNode::empty`]; the other
    /// arguments are discarded.
    #[track_caller]
    pub fn new(
        value: Option<ErrorValue>,
        msg: impl Into<String>,
        details: Option<Details>,
        code: i64,
        prev: Option<&ErrorNode>,
    ) -> Self {
        Self::new_at(Location::caller(), value, msg, details, code, prev)
    }

    /// Build a node attributed to an explicit source location, for helpers
    /// that report on behalf of a frame further up the stack.
    pub fn new_at(
        location: &'static Location<'static>,
        value: Option<ErrorValue>,
        msg: impl Into<String>,
        details: Option<Details>,
        code: i64,
        prev: Option<&ErrorNode>,
    ) -> Self {
        let Some(value) = value else {
            return Self::empty();
        };

        Self {
            value: Some(value),
            code,
            msg: msg.into(),
            details,
            file: location.file().to_string(),
            line: location.line(),
            timestamp: timestamp::now_micros(),
            prev: prev.map(|node| Box::new(node.clone())),
            stack_trace: Backtrace::force_capture().to_string().into_bytes(),
        }
    }

    /// [`ErrorNode::new`] without code or details.
    #[track_caller]
    pub fn new_without_context(
        value: Option<ErrorValue>,
        msg: impl Into<String>,
        prev: Option<&ErrorNode>,
    ) -> Self {
        Self::new_at(Location::caller(), value, msg, None, 0, prev)
    }

    /// Extend the chain: the new node's `prev` is a deep copy of `self`.
    #[track_caller]
    pub fn wrap(
        &self,
        value: Option<ErrorValue>,
        msg: impl Into<String>,
        details: Option<Details>,
        code: i64,
    ) -> Self {
        Self::new_at(Location::caller(), value, msg, details, code, Some(self))
    }

    /// Minimal lift of a plain error into a node.
    #[track_caller]
    pub fn from_error(err: Option<ErrorValue>) -> Self {
        Self::new_at(Location::caller(), err, String::new(), None, 0, None)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.value.is_some()
    }

    /// The direct predecessor, one hop down the chain. Generic callers get
    /// the same node through [`Error::source`].
    pub fn previous(&self) -> Option<&ErrorNode> {
        self.prev.as_deref()
    }

    /// Iterate from this node down to the root cause.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Number of nodes in the chain, this one included.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// The last node of the chain; `self` when there is no predecessor.
    pub fn root_cause(&self) -> &ErrorNode {
        self.chain().last().unwrap_or(self)
    }

    /// True if `target` is the value of any node in the chain, or is
    /// reachable through that value's own `source()` links.
    pub fn is(&self, target: &ErrorValue) -> bool {
        self.is_target(&**target)
    }

    fn is_target(&self, target: &(dyn Error + 'static)) -> bool {
        self.chain()
            .filter_map(|node| node.value.as_deref())
            .any(|value| reaches(value, target))
    }

    /// True when both nodes hold the same value allocation.
    pub fn value_eq(&self, other: &ErrorNode) -> bool {
        match (&self.value, &other.value) {
            (Some(left), Some(right)) => Arc::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }

    /// Value identity at every depth. Chains of different length differ.
    pub fn chain_eq(&self, other: &ErrorNode) -> bool {
        self.depth() == other.depth()
            && self
                .chain()
                .zip(other.chain())
                .all(|(left, right)| left.value_eq(right))
    }

    /// Flatten the chain into a plain error carrying the rendered text.
    pub fn to_error(&self) -> Option<PlainError> {
        if self.is_empty() {
            return None;
        }
        Some(PlainError::new(self.to_string()))
    }
}

fn reaches(value: &(dyn Error + 'static), target_err: &(dyn Error + 'static)) -> bool {
    let target = target_err as *const dyn Error as *const ();
    let mut current = Some(value);
    while let Some(err) = current {
        if err as *const dyn Error as *const () == target {
            return true;
        }
        // A wrapped node's sources are its predecessors, not its value.
        if let Some(node) = err.downcast_ref::<ErrorNode>() {
            return node.is_target(target_err);
        }
        current = err.source();
    }
    false
}

/// Iterator over a chain, newest node first.
pub struct Chain<'a> {
    next: Option<&'a ErrorNode>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a ErrorNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.prev.as_deref();
        Some(node)
    }
}

impl PartialEq for ErrorNode {
    fn eq(&self, other: &Self) -> bool {
        let details_eq = match (&self.details, &other.details) {
            (Some(left), Some(right)) => left.ptr_eq(right),
            (None, None) => true,
            _ => false,
        };

        self.value_eq(other)
            && details_eq
            && self.code == other.code
            && self.msg == other.msg
            && self.file == other.file
            && self.line == other.line
            && self.timestamp == other.timestamp
            && self.stack_trace == other.stack_trace
            && self.prev == other.prev
    }
}

impl fmt::Debug for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorNode")
            .field("value", &self.value)
            .field("code", &self.code)
            .field("msg", &self.msg)
            .field("details", &self.details)
            .field("file", &self.file)
            .field("line", &self.line)
            .field("timestamp", &self.timestamp)
            .field("prev", &self.prev)
            .field(
                "stack_trace",
                &format_args!("<{} bytes>", self.stack_trace.len()),
            )
            .finish()
    }
}

impl fmt::Display for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(value) = &self.value else {
            return Ok(());
        };

        write!(f, "value={value}")?;
        if self.code != 0 {
            write!(f, ", code={}", self.code)?;
        }
        if !self.msg.is_empty() {
            write!(f, ", msg={}", self.msg)?;
        }
        if let Some(details) = &self.details {
            write!(f, ", details={details:?}")?;
        }
        if !self.file.is_empty() {
            write!(f, ", source={}:{}", self.file, self.line)?;
        }
        if self.timestamp != 0 {
            match timestamp::format_rfc3339_nano(self.timestamp) {
                Some(stamp) => write!(f, ", timestamp={stamp}")?,
                None => write!(f, ", timestamp={}", self.timestamp)?,
            }
        }
        if let Some(prev) = &self.prev {
            write!(f, ", prev={{{prev}}}")?;
        }
        Ok(())
    }
}

impl Error for ErrorNode {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.prev.as_deref().map(|prev| prev as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAMP: i64 = 1_691_234_567_890_123;
    const STAMP_TEXT: &str = "2023-08-05T11:22:47.890123Z";

    fn plain(msg: &str) -> ErrorValue {
        error_value(PlainError::new(msg))
    }

    fn fixture(value: &ErrorValue, msg: &str, prev: Option<ErrorNode>) -> ErrorNode {
        ErrorNode {
            value: Some(value.clone()),
            msg: msg.into(),
            prev: prev.map(Box::new),
            ..ErrorNode::default()
        }
    }

    #[test]
    fn empty_node_is_empty() {
        let node = ErrorNode::empty();
        assert!(node.is_empty());
        assert!(!node.is_error());
        assert_eq!(node, ErrorNode::default());
    }

    #[test]
    fn unset_value_short_circuits() {
        let prev = ErrorNode::new(Some(plain("inner")), "inner", None, 1, None);
        let node = ErrorNode::new(
            None,
            "ignored",
            Some(Details::new("ignored")),
            42,
            Some(&prev),
        );
        assert_eq!(node, ErrorNode::empty());
        assert!(ErrorNode::from_error(None).is_empty());
    }

    #[test]
    fn new_populates_capture_fields() {
        let before = timestamp::now_micros();
        let node = ErrorNode::new(Some(plain("test")), "context", None, 7, None);
        assert!(node.is_error());
        assert_eq!(node.code, 7);
        assert_eq!(node.msg, "context");
        assert!(node.file.ends_with("node.rs"));
        assert!(node.timestamp >= before);
        assert!(!node.stack_trace.is_empty());
        assert!(node.prev.is_none());
    }

    #[test]
    fn render_empty_is_blank() {
        assert_eq!(ErrorNode::empty().to_string(), "");
    }

    #[test]
    fn render_orders_and_omits_fields() {
        let node = ErrorNode {
            value: Some(plain("test")),
            code: 100,
            msg: "msg".into(),
            file: "f.go".into(),
            line: 26,
            timestamp: STAMP,
            ..ErrorNode::default()
        };
        assert_eq!(
            node.to_string(),
            format!("value=test, code=100, msg=msg, source=f.go:26, timestamp={STAMP_TEXT}")
        );
    }

    #[test]
    fn render_without_timestamp_or_msg() {
        let node = ErrorNode {
            value: Some(plain("test")),
            file: "error_test.go".into(),
            line: 26,
            ..ErrorNode::default()
        };
        assert_eq!(node.to_string(), "value=test, source=error_test.go:26");
    }

    #[test]
    fn render_details_uses_debug_form() {
        #[derive(Debug)]
        struct Person {
            name: &'static str,
            age: u8,
        }

        let node = ErrorNode {
            value: Some(plain("test")),
            msg: "My message".into(),
            details: Some(Details::opaque(Person {
                name: "John Doe",
                age: 23,
            })),
            ..ErrorNode::default()
        };
        assert_eq!(
            node.to_string(),
            r#"value=test, msg=My message, details=Person { name: "John Doe", age: 23 }"#
        );
    }

    #[test]
    fn render_nests_previous() {
        let inner = ErrorNode {
            value: Some(plain("test 2")),
            msg: "My error message 2".into(),
            timestamp: STAMP,
            ..ErrorNode::default()
        };
        let outer = ErrorNode {
            value: Some(plain("test")),
            code: 500,
            msg: "My error message".into(),
            file: "error_test.go".into(),
            line: 26,
            timestamp: STAMP,
            prev: Some(Box::new(inner)),
            ..ErrorNode::default()
        };
        assert_eq!(
            outer.to_string(),
            format!(
                "value=test, code=500, msg=My error message, source=error_test.go:26, \
                 timestamp={STAMP_TEXT}, prev={{value=test 2, msg=My error message 2, \
                 timestamp={STAMP_TEXT}}}"
            )
        );
    }

    #[test]
    fn render_tolerates_empty_ancestor() {
        let node = fixture(&plain("outer"), "", Some(ErrorNode::empty()));
        assert_eq!(node.to_string(), "value=outer, prev={}");
    }

    #[test]
    fn render_falls_back_to_raw_timestamp() {
        let node = ErrorNode {
            value: Some(plain("test")),
            timestamp: i64::MAX,
            ..ErrorNode::default()
        };
        assert_eq!(
            node.to_string(),
            format!("value=test, timestamp={}", i64::MAX)
        );
    }

    #[test]
    fn is_matches_any_depth() {
        let e1 = plain("my error");
        let e2 = plain("my error 2");
        let e3 = plain("my error 3");
        let other = plain("my error");

        let node = fixture(
            &e1,
            "1",
            Some(fixture(&e2, "2", Some(fixture(&e3, "3", None)))),
        );

        assert!(node.is(&e1));
        assert!(node.is(&e2));
        assert!(node.is(&e3));
        assert!(!node.is(&other));
        assert!(!ErrorNode::empty().is(&e1));
    }

    #[test]
    fn is_follows_value_sources() {
        let root = plain("root");
        let inner = fixture(&root, "inner", None);
        let node = fixture(&error_value(inner), "outer", None);
        assert!(node.is(&root));
    }

    #[test]
    fn is_skips_empty_ancestors() {
        let target = plain("target");
        let node = fixture(
            &plain("outer"),
            "",
            Some(ErrorNode {
                prev: Some(Box::new(fixture(&target, "", None))),
                ..ErrorNode::default()
            }),
        );
        assert!(node.is(&target));
    }

    #[test]
    fn previous_matches_source() {
        let inner = fixture(&plain("test 2"), "inner", None);
        let outer = fixture(&plain("test"), "outer", Some(inner.clone()));
        assert_eq!(outer.previous(), Some(&inner));
        assert!(inner.previous().is_none());

        let source = outer.source().map(|err| err.to_string());
        assert_eq!(source, Some(inner.to_string()));
    }

    #[test]
    fn chain_walks_to_root() {
        let root = fixture(&plain("root"), "root", None);
        let node = fixture(
            &plain("top"),
            "top",
            Some(fixture(&plain("mid"), "mid", Some(root.clone()))),
        );
        let messages: Vec<&str> = node.chain().map(|n| n.msg.as_str()).collect();
        assert_eq!(messages, ["top", "mid", "root"]);
        assert_eq!(node.depth(), 3);
        assert_eq!(node.root_cause(), &root);
        assert_eq!(root.root_cause(), &root);
    }

    #[test]
    fn value_eq_is_identity() {
        let shared = plain("test 1");
        let left = fixture(&shared, "left", None);
        let mut right = fixture(&shared, "right", None);
        assert!(left.value_eq(&right));
        assert!(right.value_eq(&left));

        right.value = Some(plain("test 1"));
        assert!(!left.value_eq(&right));
        assert!(ErrorNode::empty().value_eq(&ErrorNode::empty()));
        assert!(!left.value_eq(&ErrorNode::empty()));
    }

    #[test]
    fn chain_eq_compares_every_depth() {
        let e1 = plain("test 1");
        let e2 = plain("test 2");
        let base = fixture(&e2, "base", None);

        let left = ErrorNode::new(Some(e1.clone()), "one", None, 300, Some(&base));
        let right = ErrorNode::new(Some(e1.clone()), "two", None, 400, Some(&base));
        assert!(left.chain_eq(&right));
        assert!(right.chain_eq(&left));

        let mut diverged = left.clone();
        if let Some(prev) = diverged.prev.as_mut() {
            prev.value = Some(plain("test 3"));
        }
        assert!(!diverged.chain_eq(&right));
        assert!(!right.chain_eq(&diverged));
    }

    #[test]
    fn chain_eq_rejects_length_mismatch() {
        let e1 = plain("test 1");
        let short = fixture(&e1, "", None);
        let long = fixture(&e1, "", Some(fixture(&plain("test 2"), "", None)));
        assert!(!short.chain_eq(&long));
        assert!(!long.chain_eq(&short));
    }

    #[test]
    fn clone_is_independent_at_depth() {
        let c = ErrorNode::new(Some(plain("c")), "c", None, 0, None);
        let b = ErrorNode::new(Some(plain("b")), "b", None, 0, Some(&c));
        let a = ErrorNode::new(Some(plain("a")), "a", None, 0, Some(&b));

        let mut copy = a.clone();
        assert_eq!(copy, a);

        let replacement = plain("replaced");
        if let Some(prev) = copy.prev.as_mut() {
            prev.value = Some(replacement.clone());
        }

        let original_prev = a.previous().and_then(|prev| prev.value.as_ref());
        assert!(original_prev.is_some_and(|value| !Arc::ptr_eq(value, &replacement)));
        assert_ne!(copy, a);
    }

    #[test]
    fn clone_keeps_empty_ancestors() {
        let empty = ErrorNode::empty();
        let inner = ErrorNode::new(Some(plain("test 2")), "inner", None, 0, Some(&empty));
        let outer = ErrorNode::new(Some(plain("test 1")), "outer", None, 0, Some(&inner));
        assert_eq!(outer.clone(), outer);
        assert_eq!(outer.depth(), 3);
    }

    #[test]
    fn constructors_deep_copy_previous() {
        let mut inner = ErrorNode::new(Some(plain("inner")), "inner", None, 0, None);
        let outer = inner.wrap(Some(plain("outer")), "outer", None, 9);

        inner.msg = "mutated".into();
        assert_eq!(outer.previous().map(|prev| prev.msg.as_str()), Some("inner"));
        assert_eq!(outer.code, 9);
    }

    #[test]
    fn to_error_flattens_render() {
        let node = ErrorNode {
            value: Some(plain("test")),
            code: 10,
            msg: "My error message".into(),
            file: "error_test.go".into(),
            line: 26,
            timestamp: STAMP,
            ..ErrorNode::default()
        };
        assert_eq!(
            node.to_error(),
            Some(PlainError::new(node.to_string()))
        );
        assert_eq!(ErrorNode::empty().to_error(), None);
    }
}
