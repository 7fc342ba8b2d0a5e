//! Decode a property's raw value according to the active encoding,
//! pulling continuation lines from the `LineSource` as needed.
//!
//! Line reading and value decoding cannot be cleanly separated in 2.1:
//! Quoted-Printable and BASE64 continuation, and RFC 2425 folding, all
//! depend on the encoding parameter that ParameterHandler just set, and all
//! need to read ahead past the property's first line. This module is the
//! one place that happens.

use std::io::BufRead;

use crate::error::ParseError;
use crate::line::LineSource;
use crate::state::{ParserState, VersionProfile};

/// Guards BASE64 accumulation against unbounded memory growth from a
/// malformed or hostile stream. Real out-of-memory conditions cannot be
/// caught in safe Rust; this cap is the practical stand-in the spec's
/// "recover by substituting a null value" policy maps onto.
const MAX_BASE64_ACCUMULATED_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("line {0}: unexpected end of stream")]
    UnexpectedEof(usize),
    #[error("line {0}: AGENT value embeds a nested vCard, which is not supported")]
    AgentNotSupported(usize),
    #[error("line {line}: VERSION {found:?} is incompatible with {expected}")]
    IncompatibleVersion {
        line: usize,
        expected: &'static str,
        found: String,
    },
}

/// A decoded property value: a single string, a list of strings (for the
/// structured ADR/ORG/N properties), a raw byte buffer (BASE64), or the
/// BASE64 out-of-memory recovery placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
    Bytes(Vec<u8>),
    Null,
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PropertyValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Decode `raw_value` for the property named `name_upper` (already
/// uppercased). Returns `Ok(None)` for the AGENT-with-empty-body case,
/// which the driver must not turn into an emitted property.
pub fn decode_value<R: BufRead>(
    name_upper: &str,
    raw_value: &str,
    line_number: usize,
    source: &mut LineSource<R>,
    state: &mut ParserState,
    profile: &VersionProfile,
) -> Result<Option<PropertyValue>, ParseError> {
    if name_upper == "AGENT" {
        return decode_agent(raw_value, line_number);
    }
    if name_upper == "VERSION" {
        return decode_version(raw_value, line_number, profile).map(Some);
    }

    let joined = match state.current_encoding.as_str() {
        "QUOTED-PRINTABLE" => {
            if raw_value.trim_end().ends_with('=') {
                decode_quoted_printable(raw_value, source, line_number)?
            } else {
                raw_value.to_string()
            }
        }
        "BASE64" | "B" => {
            return decode_base64(source, line_number, profile).map(Some);
        }
        _ => decode_plain(raw_value, source)?,
    };

    if profile.structured_properties.contains(&name_upper) {
        Ok(Some(PropertyValue::List(split_structured(&joined))))
    } else {
        let unescaped = (profile.unescape_text)(&joined);
        Ok(Some(PropertyValue::Text(unescaped.into_owned())))
    }
}

fn decode_agent(raw_value: &str, line_number: usize) -> Result<Option<PropertyValue>, ParseError> {
    if raw_value.to_ascii_uppercase().contains("BEGIN:VCARD") {
        Err(DecodeError::AgentNotSupported(line_number).into())
    } else {
        // Observed on some devices that emit empty AGENT lines.
        Ok(None)
    }
}

fn decode_version(
    raw_value: &str,
    line_number: usize,
    profile: &VersionProfile,
) -> Result<PropertyValue, ParseError> {
    let found = raw_value.trim();
    if found == profile.version {
        Ok(PropertyValue::Text(found.to_string()))
    } else {
        Err(DecodeError::IncompatibleVersion {
            line: line_number,
            expected: profile.version,
            found: found.to_string(),
        }
        .into())
    }
}

fn decode_quoted_printable<R: BufRead>(
    first: &str,
    source: &mut LineSource<R>,
    line_number: usize,
) -> Result<String, ParseError> {
    let mut acc = String::new();
    let mut current = first.to_string();
    loop {
        // Only transport-padding whitespace is stripped here; the soft
        // line-break '=' itself is content the consumer's QP decoder
        // still needs to see, so it is kept and a CRLF appended after it.
        let trimmed = current.trim_end().to_string();
        if trimmed.ends_with('=') {
            acc.push_str(&trimmed);
            acc.push_str("\r\n");
            match source.read_line()? {
                Some(next) => current = next.as_str().to_string(),
                None => return Err(DecodeError::UnexpectedEof(line_number).into()),
            }
        } else {
            acc.push_str(&trimmed);
            return Ok(acc);
        }
    }
}

enum Base64Step {
    Eof,
    Terminated,
    PropertyBoundary,
    More,
}

fn decode_base64<R: BufRead>(
    source: &mut LineSource<R>,
    line_number: usize,
    profile: &VersionProfile,
) -> Result<PropertyValue, ParseError> {
    let mut accumulated = String::new();
    let mut overflowed = false;

    loop {
        let step = match source.peek_line()? {
            None => Base64Step::Eof,
            Some(next) if next.as_str().is_empty() => Base64Step::Terminated,
            Some(next) if looks_like_known_property(next.as_str(), profile) => {
                Base64Step::PropertyBoundary
            }
            Some(_) => Base64Step::More,
        };

        match step {
            Base64Step::Eof => return Err(DecodeError::UnexpectedEof(line_number).into()),
            Base64Step::Terminated => {
                source.read_line()?;
                break;
            }
            Base64Step::PropertyBoundary => break,
            Base64Step::More => {
                let line = source.read_line()?.expect("peeked line must exist");
                if overflowed {
                    continue;
                }
                if accumulated.len() + line.as_str().len() > MAX_BASE64_ACCUMULATED_BYTES {
                    overflowed = true;
                    accumulated.clear();
                } else {
                    accumulated.push_str(line.as_str().trim());
                }
            }
        }
    }

    if overflowed {
        return Ok(PropertyValue::Null);
    }

    use base64::Engine;
    match base64::engine::general_purpose::STANDARD.decode(accumulated.as_bytes()) {
        Ok(bytes) => Ok(PropertyValue::Bytes(bytes)),
        Err(_) => Ok(PropertyValue::Null),
    }
}

fn looks_like_known_property(line: &str, profile: &VersionProfile) -> bool {
    let Some(colon) = line.find(':') else {
        return false;
    };
    let prefix = &line[..colon];
    let name_token = prefix.rsplit(['.', ';']).next().unwrap_or(prefix);
    profile
        .known_property_names
        .iter()
        .any(|known| known.eq_ignore_ascii_case(name_token))
}

fn decode_plain<R: BufRead>(first: &str, source: &mut LineSource<R>) -> Result<String, ParseError> {
    let mut acc = first.to_string();
    loop {
        let should_fold = match source.peek_line()? {
            Some(next) => {
                let candidate = next.as_str();
                candidate.starts_with(' ') && !candidate.to_ascii_uppercase().starts_with("END:VCARD")
            }
            None => false,
        };
        if !should_fold {
            break;
        }
        let line = source.read_line()?.expect("peeked line must exist");
        log::debug!("line {}: folded continuation consumed", line.number());
        acc.push_str(&line.as_str()[1..]);
    }
    Ok(acc)
}

/// Split a structured property's joined value on unescaped ';'. A
/// backslash escapes the following ';', ':', ',', or '\\'; any other
/// escape sequence is left literal.
fn split_structured(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if matches!(next, ';' | ':' | ',' | '\\') => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push(c),
            }
        } else if c == ';' {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}
