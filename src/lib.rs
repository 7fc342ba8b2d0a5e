//! A streaming vCard 2.1 lexer/parser.
//!
//! Parsing is push-style: register one or more consumers on a [`VCardParser`],
//! call [`VCardParser::parse`] with a byte stream, and the parser drives
//! `onVCardStarted` / `onEntryStarted` / property / `onEntryEnded` /
//! `onVCardEnded` events through them in source order. There is no tree
//! representation of a card built up internally — a consumer that wants one
//! builds it from the events itself.
//!
//! ```
//! use vcard21::{EventConsumer, VCardParser, VCardProperty};
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl EventConsumer for Names {
//!     fn on_property_created(&mut self, property: &VCardProperty) {
//!         if property.name.eq_ignore_ascii_case("FN") {
//!             self.0.push(property.value.as_text().unwrap_or_default().to_owned());
//!         }
//!     }
//! }
//!
//! let mut names = Names::default();
//! let mut parser = VCardParser::new();
//! parser.add_consumer(&mut names);
//! parser.parse(b"BEGIN:VCARD\r\nFN:Jane Doe\r\nEND:VCARD\r\n".as_slice()).unwrap();
//! assert_eq!(names.0, vec!["Jane Doe".to_string()]);
//! ```

mod decoder;
mod dissector;
mod driver;
mod error;
mod event;
mod line;
mod parameter;
mod state;

pub use decoder::PropertyValue;
pub use driver::{DriverError, VCardParser};
pub use error::{DecodeError, DissectError, LineError, ParamError, ParseError};
pub use event::{EventConsumer, EventFanout, VCardProperty};
pub use state::VersionProfile;
