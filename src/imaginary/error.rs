//! Client input errors produced while translating a request.

use thiserror::Error;

/// Reason an inbound request could not be translated.
///
/// All variants are client errors and are reported with code 404.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("You must define method")]
    MethodMissing,

    #[error("Method {0} is not allowed")]
    MethodNotAllowed(String),

    #[error("You must define width")]
    WidthMissing,

    #[error("You must define height")]
    HeightMissing,
}

impl TranslateError {
    /// Code carried in the JSON error body and the HTTP status.
    pub fn code(&self) -> u16 {
        404
    }
}
