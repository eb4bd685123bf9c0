use std::error::Error as _;

use thiserror::Error;

use crate::context::UnpackError;
use crate::driver::DriverError;

/// Why a context could not be constructed.
///
/// Recorded on the context as its error message; the context itself stays
/// addressable and disposable.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("error opening driver library")]
    Library(#[source] DriverError),

    #[error("error retrieving default display")]
    NoDisplay(#[source] DriverError),

    #[error("error initializing display")]
    InitializeDisplay(#[source] DriverError),

    #[error("error choosing surface config")]
    ChooseConfig(#[source] DriverError),

    #[error("error creating native context")]
    CreateContext(#[source] DriverError),

    #[error("error creating pbuffer surface")]
    CreateSurface(#[source] DriverError),

    #[error("error making context current")]
    MakeCurrent(#[source] DriverError),
}

impl CreateError {
    /// The error and its causes joined into one line.
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Failure of an operation on an existing context.
///
/// Kept apart from GL error codes, which only surface through
/// [`Current::get_error`](crate::session::Current::get_error).
#[derive(Debug, Error)]
pub enum ContextError {
    /// The context is unknown, not ready, or could not be made current.
    #[error("invalid GL context")]
    InvalidContext,

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Unpack(#[from] UnpackError),
}
