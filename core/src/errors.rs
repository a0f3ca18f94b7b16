//! Errors that abort a generation pass.
//!
//! Problems in the analysed program are never reported through this type:
//! they become [`Diagnostic`](crate::diagnostics::Diagnostic)s returned next to
//! the best-effort output. An [`Error`] means no output was produced at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The host signalled cancellation; the partially built pass is discarded.
    #[error("generation pass cancelled")]
    Cancelled,

    /// The compilation snapshot could not be encoded for fingerprinting.
    #[error("failed to encode compilation snapshot: {0}")]
    Fingerprint(postcard::Error),
}

impl From<postcard::Error> for Error {
    fn from(err: postcard::Error) -> Self {
        Error::Fingerprint(err)
    }
}

impl Error {
    /// Whether this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
