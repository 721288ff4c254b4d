//! Error types for the push-to-talk engine core

use thiserror::Error;

/// Main error type for engine operations.
///
/// Only wire-contract violations surface as errors. A payload that is merely
/// missing fields is handled by the decoders returning `None` and is never an
/// error; these variants cover fields that are present but corrupt, which the
/// native layer promises not to produce.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PttError {
    /// A timestamp field was present but not a base-10 integer
    #[error("malformed timestamp in field `{field}`: {value:?}")]
    MalformedTimestamp {
        /// Wire key of the offending field
        field: &'static str,
        /// The raw value as received
        value: String,
    },

    /// A contact payload claimed more than one channel kind at once
    #[error("contact payload `{name}` matches more than one channel kind")]
    AmbiguousContactKind {
        /// Contact name from the payload
        name: String,
    },
}

/// Result type alias using PttError
pub type PttResult<T> = Result<T, PttError>;
