//! The top-level `BEGIN:VCARD` / `END:VCARD` state machine.
//!
//! This is the one place that ties `line`, `dissector`, `parameter`, and
//! `decoder` together and drives an [`EventFanout`]. The dispatch loop is
//! the same shape as the original source's recursive component walk
//! (`match name.to_uppercase().as_str() { "END" => ..., "BEGIN" => ...,
//! _ => ... }`), generalised so a nested `BEGIN` recurses into a nested
//! entry instead of a typed sub-component.

use std::io::{BufRead, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::decoder::{self, DecodeError};
use crate::dissector::{self, DissectError};
use crate::error::ParseError;
use crate::event::{EventConsumer, EventFanout, VCardProperty};
use crate::line::{Line, LineSource};
use crate::parameter;
use crate::state::{ParserState, VersionProfile};

/// Errors raised by the top-level BEGIN/END state machine itself, as
/// opposed to one of the layers it drives.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("line {line}: expected BEGIN:VCARD, found {found:?}")]
    MissingBegin { line: usize, found: String },

    #[error("line {line}: expected VCARD after {keyword}, found {value:?}")]
    UnknownBeginOrEnd {
        line: usize,
        keyword: &'static str,
        value: String,
    },

    /// Reserved for callers layering a stricter property allowlist on top
    /// of this core; the core itself never raises it, since recognising
    /// property names is the entry aggregator's job, not this lexer's.
    #[error("line {line}: unrecognised property {name:?}")]
    UnknownProperty { line: usize, name: String },
}

/// Drives `BEGIN:VCARD` / `END:VCARD` parsing and fans decoded properties
/// out to registered [`EventConsumer`]s.
pub struct VCardParser<'a> {
    profile: VersionProfile,
    lenient: bool,
    fanout: EventFanout<'a>,
    cancelled: Arc<AtomicBool>,
}

impl<'a> VCardParser<'a> {
    /// Strict mode: a non-blank line that is not `BEGIN:VCARD` at the top
    /// level is a [`DriverError::MissingBegin`].
    pub fn new() -> Self {
        Self::with_profile(VersionProfile::v2_1(), false)
    }

    /// Lenient mode: the same top-level search for `BEGIN:VCARD` stops
    /// cleanly, with no error, the first time it meets a non-blank line
    /// that is not `BEGIN:VCARD`.
    pub fn lenient() -> Self {
        Self::with_profile(VersionProfile::v2_1(), true)
    }

    fn with_profile(profile: VersionProfile, lenient: bool) -> Self {
        Self {
            profile,
            lenient,
            fanout: EventFanout::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn add_consumer(&mut self, consumer: &'a mut dyn EventConsumer) {
        self.fanout.add(consumer);
    }

    /// A handle a caller can flip from another thread to stop the parse
    /// at the next line boundary, without the parser needing to expose
    /// `&mut self` across threads.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Parse every `BEGIN:VCARD` ... `END:VCARD` entry found in `input`,
    /// driving registered consumers in source order. `onVCardStarted` /
    /// `onVCardEnded` bracket the whole call; `onEntryStarted` /
    /// `onEntryEnded` bracket each entry, top-level or nested. End of
    /// stream with zero or more entries already parsed is always a clean
    /// stop; it is never an error, strict mode or not. On error the parse
    /// terminates abruptly and `onVCardEnded` does not fire.
    pub fn parse<R: Read>(&mut self, input: R) -> Result<(), ParseError> {
        let mut source = LineSource::new(BufReader::new(input));
        self.fanout.vcard_started();
        self.parse_source(&mut source)?;
        self.fanout.vcard_ended();
        Ok(())
    }

    fn parse_source<R: BufRead>(&mut self, source: &mut LineSource<R>) -> Result<(), ParseError> {
        let mut state = ParserState::default();
        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                return Ok(());
            }
            let Some(begin_line) = find_next_begin(source, self.lenient)? else {
                return Ok(());
            };
            self.fanout.entry_started();
            self.parse_items(source, &mut state, begin_line)?;
            self.fanout.entry_ended();
        }
    }

    /// Consume lines until a matching `END:VCARD`, dispatching each
    /// property to the fanout and recursing into nested entries. `begin_line`
    /// is the line number of the `BEGIN:VCARD` this call is closing out, used
    /// to report an unexpected end of stream.
    fn parse_items<R: BufRead>(
        &mut self,
        source: &mut LineSource<R>,
        state: &mut ParserState,
        begin_line: usize,
    ) -> Result<(), ParseError> {
        loop {
            let line = match source.read_line()? {
                Some(line) => line,
                None => return Err(DecodeError::UnexpectedEof(begin_line).into()),
            };

            let split = match dissector::split_line(&line) {
                Ok(split) => split,
                Err(DissectError::InvalidComment(n)) => {
                    log::debug!("line {n}: comment line skipped");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match split.name.to_ascii_uppercase().as_str() {
                "END" => {
                    expect_vcard_value(&split.raw_value, &line, "END")?;
                    return Ok(());
                }
                "BEGIN" => {
                    expect_vcard_value(&split.raw_value, &line, "BEGIN")?;
                    self.fanout.entry_started();
                    self.parse_items(source, state, line.number())?;
                    self.fanout.entry_ended();
                }
                name_upper => {
                    state.reset_encoding();
                    let mut parameters = Vec::with_capacity(split.param_tokens.len());
                    for token in &split.param_tokens {
                        parameters.push(parameter::classify(token, line.number(), state, &self.profile)?);
                    }

                    let decoded = decoder::decode_value(
                        name_upper,
                        &split.raw_value,
                        line.number(),
                        source,
                        state,
                        &self.profile,
                    )?;

                    if let Some(value) = decoded {
                        let property = VCardProperty {
                            groups: split.groups.clone(),
                            name: split.name.clone(),
                            parameters,
                            value,
                        };
                        self.fanout.property(&property);
                    }
                }
            }
        }
    }
}

impl<'a> Default for VCardParser<'a> {
    fn default() -> Self {
        Self::new()
    }
}

fn expect_vcard_value(raw_value: &str, line: &Line, keyword: &'static str) -> Result<(), ParseError> {
    if raw_value.trim().eq_ignore_ascii_case("VCARD") {
        Ok(())
    } else {
        Err(DriverError::UnknownBeginOrEnd {
            line: line.number(),
            keyword,
            value: raw_value.trim().to_string(),
        }
        .into())
    }
}

enum NextBeginDecision {
    Eof,
    Blank,
    Begin,
    Other { line: usize, found: String },
}

/// Skip blank lines until `BEGIN:VCARD`, end of stream, or (strict mode) a
/// non-blank line that is not `BEGIN:VCARD`, whichever comes first. Returns
/// the line number of the consumed `BEGIN:VCARD`, or `None` on a clean stop.
fn find_next_begin<R: BufRead>(source: &mut LineSource<R>, lenient: bool) -> Result<Option<usize>, ParseError> {
    loop {
        let decision = match source.peek_line()? {
            None => NextBeginDecision::Eof,
            Some(line) if line.as_str().trim().is_empty() => NextBeginDecision::Blank,
            Some(line) if line.as_str().trim().eq_ignore_ascii_case("BEGIN:VCARD") => NextBeginDecision::Begin,
            Some(line) => NextBeginDecision::Other {
                line: line.number(),
                found: line.as_str().to_string(),
            },
        };

        match decision {
            NextBeginDecision::Eof => return Ok(None),
            NextBeginDecision::Blank => {
                source.read_line()?;
            }
            NextBeginDecision::Begin => {
                let line = source.read_line()?.expect("peeked line must exist");
                return Ok(Some(line.number()));
            }
            NextBeginDecision::Other { line, found } => {
                if lenient {
                    return Ok(None);
                }
                return Err(DriverError::MissingBegin { line, found }.into());
            }
        }
    }
}
