//! Errors reported at the API contract level

use thiserror::Error;

use crate::types::ApiError;

/// Failures detectable from a decoded Marketo response envelope
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("{operation} reported failure: {errors:?}")]
    Vendor {
        operation: &'static str,
        errors: Vec<ApiError>,
    },

    #[error("{operation} returned an empty result")]
    EmptyResult { operation: &'static str },

    #[error("{operation} returned a record without an id")]
    MissingId { operation: &'static str },
}
