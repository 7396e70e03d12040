//! Configuration-time error taxonomy and the error reporting switch.
//!
//! Every fault in this crate is raised from a configuration path (`prepare`,
//! graph validation, external data binding, library initialisation). The
//! render path (`process` / `process_frame`) has no error path at all.
//!
//! # Reporting modes
//!
//! All fault sites go through [`raise`] and return its result immediately:
//!
//! ```rust,ignore
//! if specs.num_channels < N {
//!     return error::raise(NodeError::new(ErrorCode::ChannelMismatch, N, specs.num_channels));
//! }
//! ```
//!
//! - Default build: `raise` returns `Err(error)` and the caller propagates it
//!   with `?`.
//! - With the `error-slot` feature: `raise` stores the error in a single
//!   process-wide slot and returns `Ok(())`. This is the mode used when the
//!   call crosses a module boundary where unwinding or rich error types are
//!   not an option. Callers poll [`take_last_error`] right after the call.
//!
//! [`poll`] folds both modes into one `Result`, so host code can be written
//! once for either build.

use parking_lot::Mutex;
use thiserror::Error;

/// Closed set of configuration faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    /// Channel count of a node does not match its parent or caller.
    ChannelMismatch,
    /// Block size differs from the one the node was prepared with.
    BlockSizeMismatch,
    /// A block-only node was asked to run per frame.
    IllegalFrameCall,
    /// Block size is zero, too large, or not usable by a wrapper.
    IllegalBlockSize,
    /// Sample rate is invalid or differs from the prepared one.
    SampleRateMismatch,
    /// A node failed to initialise.
    InitialisationError,
    /// More child nodes than a container can hold or address.
    TooManyChildNodes,
    /// More parameters or modulation sources than allowed.
    TooManyParameters,
    /// A polyphonic voice context reached a node that forbids it.
    IllegalPolyphony,
    /// A node requires a polyphonic context but was prepared without one.
    IllegalMonophony,
    /// A modulation route or wrapper is configured on a node that cannot act
    /// as a modulation source.
    IllegalModulation,
    /// Clone count outside the allowed range of a duplicate wrapper.
    CloneMismatch,
    /// A parameter descriptor was used before it was connected.
    UnconnectedParameter,
    /// External data of the wrong kind or index was bound to a node.
    InvalidExternalData,
    /// A node id or index is not known to a library.
    UnknownNode,
    /// Encoded parameter data could not be decoded.
    InvalidParameterData,
}

impl ErrorCode {
    /// All codes, in declaration order.
    pub const ALL: [ErrorCode; 16] = [
        ErrorCode::ChannelMismatch,
        ErrorCode::BlockSizeMismatch,
        ErrorCode::IllegalFrameCall,
        ErrorCode::IllegalBlockSize,
        ErrorCode::SampleRateMismatch,
        ErrorCode::InitialisationError,
        ErrorCode::TooManyChildNodes,
        ErrorCode::TooManyParameters,
        ErrorCode::IllegalPolyphony,
        ErrorCode::IllegalMonophony,
        ErrorCode::IllegalModulation,
        ErrorCode::CloneMismatch,
        ErrorCode::UnconnectedParameter,
        ErrorCode::InvalidExternalData,
        ErrorCode::UnknownNode,
        ErrorCode::InvalidParameterData,
    ];

    /// Short human-readable description.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::ChannelMismatch => "Channel amount mismatch",
            ErrorCode::BlockSizeMismatch => "Blocksize mismatch",
            ErrorCode::IllegalFrameCall => "Can't be used in frame processing context",
            ErrorCode::IllegalBlockSize => "Illegal block size",
            ErrorCode::SampleRateMismatch => "Samplerate mismatch",
            ErrorCode::InitialisationError => "Initialisation error",
            ErrorCode::TooManyChildNodes => "Too many child nodes",
            ErrorCode::TooManyParameters => "Too many parameters",
            ErrorCode::IllegalPolyphony => "Can't use this node in a polyphonic network",
            ErrorCode::IllegalMonophony => "This node requires a polyphonic network",
            ErrorCode::IllegalModulation => "Illegal modulation connection",
            ErrorCode::CloneMismatch => "Clone count mismatch",
            ErrorCode::UnconnectedParameter => "Parameter is not connected",
            ErrorCode::InvalidExternalData => "Invalid external data",
            ErrorCode::UnknownNode => "Unknown node",
            ErrorCode::InvalidParameterData => "Invalid parameter data",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

fn render(code: &ErrorCode, expected: &i64, actual: &i64) -> String {
    match code {
        ErrorCode::TooManyChildNodes => format!(
            "Number of child nodes ({actual}) exceed channels ({expected})"
        ),
        ErrorCode::TooManyParameters => format!(
            "Number of modulation sources ({actual}) exceed limit ({expected})"
        ),
        ErrorCode::IllegalBlockSize => format!("Illegal block size: {actual}"),
        ErrorCode::UnconnectedParameter => format!("Parameter {expected} is not connected"),
        ErrorCode::IllegalPolyphony
        | ErrorCode::IllegalMonophony
        | ErrorCode::IllegalFrameCall
        | ErrorCode::InitialisationError => code.message().to_string(),
        _ => format!("{}: expected {expected}, got {actual}", code.message()),
    }
}

/// A configuration fault: the `(code, expected, actual)` triple shown to the
/// assembling layer for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", render(.code, .expected, .actual))]
pub struct NodeError {
    /// What went wrong.
    pub code: ErrorCode,
    /// The value the node expected (channel count, voice limit, ...).
    pub expected: i64,
    /// The value it actually got.
    pub actual: i64,
}

impl NodeError {
    /// Creates an error triple.
    pub fn new(code: ErrorCode, expected: impl TryInto<i64>, actual: impl TryInto<i64>) -> Self {
        Self {
            code,
            expected: expected.try_into().unwrap_or(i64::MAX),
            actual: actual.try_into().unwrap_or(i64::MAX),
        }
    }

    /// Creates an error that carries no numeric detail.
    pub fn code(code: ErrorCode) -> Self {
        Self {
            code,
            expected: 0,
            actual: 0,
        }
    }
}

/// Result type of every configuration path in this crate.
pub type Result<T> = core::result::Result<T, NodeError>;

static LAST_ERROR: Mutex<Option<NodeError>> = parking_lot::const_mutex(None);

/// Reports a configuration fault.
///
/// Returns `Err(error)` in the default build. With the `error-slot` feature
/// the error is written to the last-error slot and `Ok(())` is returned.
/// Either way the call site is `return error::raise(...)`.
pub fn raise(error: NodeError) -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        code = ?error.code,
        expected = error.expected,
        actual = error.actual,
        "configuration error"
    );

    #[cfg(feature = "error-slot")]
    {
        *LAST_ERROR.lock() = Some(error);
        Ok(())
    }

    #[cfg(not(feature = "error-slot"))]
    {
        Err(error)
    }
}

/// Removes and returns the error stored in the last-error slot.
pub fn take_last_error() -> Option<NodeError> {
    LAST_ERROR.lock().take()
}

/// Returns the error stored in the last-error slot without clearing it.
pub fn last_error() -> Option<NodeError> {
    *LAST_ERROR.lock()
}

/// Clears the last-error slot.
pub fn clear_last_error() {
    *LAST_ERROR.lock() = None;
}

/// Folds both reporting modes into one result.
///
/// Returns the error from `result` if there is one, otherwise drains the
/// last-error slot.
pub fn poll(result: Result<()>) -> Result<()> {
    result?;
    match take_last_error() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_is_reported_through_poll() {
        let err = NodeError::new(ErrorCode::ChannelMismatch, 2, 1);
        assert_eq!(poll(raise(err)), Err(err));
        assert_eq!(take_last_error(), None);
    }

    #[cfg(not(feature = "error-slot"))]
    #[test]
    fn default_mode_returns_error() {
        let err = NodeError::code(ErrorCode::IllegalPolyphony);
        assert_eq!(raise(err), Err(err));
        assert_eq!(last_error(), None);
    }

    #[cfg(feature = "error-slot")]
    #[test]
    fn slot_mode_stores_error() {
        let err = NodeError::code(ErrorCode::IllegalPolyphony);
        assert_eq!(raise(err), Ok(()));
        assert_eq!(take_last_error(), Some(err));
    }

    #[test]
    fn messages_carry_the_triple() {
        let err = NodeError::new(ErrorCode::TooManyChildNodes, 2, 3);
        assert_eq!(err.to_string(), "Number of child nodes (3) exceed channels (2)");

        let err = NodeError::new(ErrorCode::ChannelMismatch, 2, 1);
        assert_eq!(err.to_string(), "Channel amount mismatch: expected 2, got 1");

        let err = NodeError::code(ErrorCode::IllegalPolyphony);
        assert_eq!(err.to_string(), "Can't use this node in a polyphonic network");
    }

    #[test]
    fn every_code_has_a_message() {
        for code in ErrorCode::ALL {
            assert!(!code.message().is_empty());
        }
    }
}
