//! The error taxonomy for a single `parse` call.
//!
//! Each lexing/parsing layer raises its own `thiserror`-derived enum; they
//! compose into [`ParseError`] so a caller matching on one type sees every
//! failure mode without needing to know which layer produced it.

pub use crate::decoder::DecodeError;
pub use crate::dissector::DissectError;
use crate::driver::DriverError;
pub use crate::line::LineError;
pub use crate::parameter::ParamError;

/// A fatal parse failure. Only [`DissectError::InvalidComment`] and the
/// BASE64 out-of-memory case are recovered internally; everything else
/// surfaces here and terminates the parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Line(#[from] LineError),

    #[error(transparent)]
    Dissect(#[from] DissectError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}
