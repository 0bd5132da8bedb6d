/*============================================================
  Synavera Project: xerr
  Module: xerr::json
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Project error chains onto their JSON wire form. Field
    order and omission rules are a compatibility contract
    with existing log consumers.

  Security / Safety Notes:
    Stack traces are emitted only when explicitly requested.

  Dependencies:
    serde for the wire struct, serde_json for encoding with
    an HTML-safe formatter.

  Operational Scope:
    Backs ErrorNode::to_json, ErrorNode::to_json_or_empty and
    the Serialize impl used when nodes are embedded elsewhere.

  Revision History:
    2026-10-15 COD  Authored JSON projection.
    2026-10-15 COD  Escape HTML-significant characters; project
                    details as a value tree for non-JSON
                    serializers.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Payload failures degrade to null, never abort
    - Encoding failures are reported as error nodes
============================================================*/

use std::borrow::Cow;
use std::io;
use std::panic::Location;

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use serde_json::value::RawValue;

use crate::error::Result;
use crate::node::{error_value, ErrorNode};
use crate::timestamp;

const MARSHAL_FAILURE: &str = "failed to convert error chain into JSON";

/// How details reach the wire: verbatim JSON text for `to_json`, a value
/// tree for any other serializer.
#[derive(Clone, Copy)]
enum Projection {
    Raw,
    Tree,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireDetails {
    Raw(Box<RawValue>),
    Tree(serde_json::Value),
}

#[derive(Serialize)]
struct Wire<'a> {
    value: String,
    details: Option<WireDetails>,
    timestamp: String,
    #[serde(skip_serializing_if = "is_unset")]
    code: i64,
    msg: &'a str,
    file: &'a str,
    line: u32,
    prev: Option<Box<Wire<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack_trace: Option<Cow<'a, str>>,
}

fn is_unset(code: &i64) -> bool {
    *code == 0
}

impl<'a> Wire<'a> {
    fn from_node(
        node: &'a ErrorNode,
        projection: Projection,
        include_stack_trace: bool,
    ) -> Result<Self> {
        let prev = node
            .prev
            .as_deref()
            .map(|prev| Wire::from_node(prev, projection, false).map(Box::new))
            .transpose()?;

        let details = node.details.as_ref().and_then(|details| match projection {
            Projection::Raw => details.to_json().ok().map(WireDetails::Raw),
            Projection::Tree => details.to_value().ok().map(WireDetails::Tree),
        });

        Ok(Self {
            value: node
                .value
                .as_ref()
                .map(|value| value.to_string())
                .unwrap_or_default(),
            details,
            timestamp: timestamp::strict_rfc3339_nano(node.timestamp)?,
            code: node.code,
            msg: &node.msg,
            file: &node.file,
            line: node.line,
            prev,
            stack_trace: (include_stack_trace && node.is_error())
                .then(|| String::from_utf8_lossy(&node.stack_trace)),
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, HtmlSafe);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

/// Compact output that additionally escapes `<`, `>`, `&`, U+2028 and
/// U+2029, matching the encoding existing consumers compare against.
struct HtmlSafe;

impl Formatter for HtmlSafe {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_html_safe(writer, fragment)
    }

    // These characters only occur inside strings in valid JSON text.
    fn write_raw_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_html_safe(writer, fragment)
    }
}

fn write_html_safe<W>(writer: &mut W, fragment: &str) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    let mut start = 0;
    for (index, ch) in fragment.char_indices() {
        let escaped = match ch {
            '<' => "\\u003c",
            '>' => "\\u003e",
            '&' => "\\u0026",
            '\u{2028}' => "\\u2028",
            '\u{2029}' => "\\u2029",
            _ => continue,
        };
        writer.write_all(fragment[start..index].as_bytes())?;
        writer.write_all(escaped.as_bytes())?;
        start = index + ch.len_utf8();
    }
    writer.write_all(fragment[start..].as_bytes())
}

impl ErrorNode {
    /// Encode the chain as JSON.
    ///
    /// The empty node encodes to no bytes. Details that cannot be encoded
    /// become `null`; any other encoding failure comes back as a new node
    /// attributed to the caller.
    #[allow(clippy::result_large_err)]
    #[track_caller]
    pub fn to_json(&self, include_stack_trace: bool) -> std::result::Result<Vec<u8>, ErrorNode> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let location = Location::caller();
        Wire::from_node(self, Projection::Raw, include_stack_trace)
            .and_then(|wire| wire.encode())
            .map_err(|err| {
                ErrorNode::new_at(location, Some(error_value(err)), MARSHAL_FAILURE, None, 0, None)
            })
    }

    /// [`ErrorNode::to_json`] without stack trace; failures yield no bytes.
    pub fn to_json_or_empty(&self) -> Vec<u8> {
        self.to_json(false).unwrap_or_default()
    }
}

impl Serialize for ErrorNode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Wire::from_node(self, Projection::Tree, false)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}
