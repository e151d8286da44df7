//! Error types for the rTorrent client.

use thiserror::Error;

/// Result type for rTorrent client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// rTorrent client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No tracker index was supplied for a tracker query.
    #[error("nil tracker index")]
    NilTrackerIndex,

    /// The field was never requested, so the record holds no value for it.
    #[error("no field found")]
    NoField,

    /// The field is not part of the known tracker field vocabulary.
    #[error("unknown field: {0}")]
    UnknownField(&'static str),

    /// A wire value arrived in a representation the target type does not
    /// accept.
    #[error("bad data")]
    BadData,

    /// The server answered a multicall with a structurally empty row.
    #[error("no data from tracker")]
    NoDataFromTracker,

    /// A response row did not line up with the requested field list.
    #[error("field count mismatch: expected {expected}, got {got}")]
    FieldCountMismatch { expected: usize, got: usize },

    /// A textual wire value failed to parse as a base-10 integer.
    #[error("invalid integer: {0}")]
    InvalidInteger(#[from] std::num::ParseIntError),

    /// The caller's cancellation signal fired before the call completed.
    #[error("request cancelled")]
    Cancelled,

    /// Propagated verbatim from the underlying RPC transport.
    #[error("transport error: {0}")]
    Transport(String),
}
