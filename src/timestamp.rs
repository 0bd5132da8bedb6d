/*============================================================
  Synavera Project: xerr
  Module: xerr::timestamp
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Capture node timestamps as microseconds since the Unix
    epoch and render them as RFC 3339 UTC strings with
    trailing fractional zeros trimmed.

  Security / Safety Notes:
    Pure computation; reads the system clock only.

  Dependencies:
    chrono for clock access and calendar formatting.

  Operational Scope:
    Shared by chain rendering and JSON conversion.

  Revision History:
    2026-10-15 COD  Introduced timestamp helpers.
  ------------------------------------------------------------
  SSE Principles Observed:
    - UTC everywhere
    - Deterministic formatting for auditability
============================================================*/

use chrono::{DateTime, Datelike, Utc};

use crate::error::{Result, XerrError};

/// Current time in microseconds since the Unix epoch.
pub fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Render `micros` as RFC 3339 UTC with up to nine fractional digits,
/// dropping trailing zeros (and the dot when the fraction is zero).
///
/// Returns `None` when the instant falls outside chrono's calendar.
pub fn format_rfc3339_nano(micros: i64) -> Option<String> {
    let stamp = DateTime::from_timestamp_micros(micros)?;
    Some(render(&stamp))
}

/// Like [`format_rfc3339_nano`] but restricted to the four-digit years
/// RFC 3339 can express.
pub fn strict_rfc3339_nano(micros: i64) -> Result<String> {
    let stamp = DateTime::from_timestamp_micros(micros).ok_or(XerrError::Timestamp(micros))?;
    if !(0..=9999).contains(&stamp.year()) {
        return Err(XerrError::Timestamp(micros));
    }
    Ok(render(&stamp))
}

fn render(stamp: &DateTime<Utc>) -> String {
    let mut out = stamp.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = stamp.timestamp_subsec_nanos();
    if nanos != 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push('Z');
    out
}
