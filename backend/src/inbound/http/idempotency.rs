//! Parsing of the `Idempotency-Key` header.

use actix_web::http::header::HeaderMap;

use crate::domain::{Error, IdempotencyKey, IdempotencyKeyValidationError};

/// HTTP header name for idempotency keys.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Extract the idempotency key from request headers.
///
/// # Errors
///
/// A missing or empty header yields `Missing Idempotency-Key header`; a
/// value that is not visible ASCII is rejected separately.
pub fn extract_idempotency_key(headers: &HeaderMap) -> Result<IdempotencyKey, Error> {
    let raw = match headers.get(IDEMPOTENCY_KEY_HEADER) {
        None => return Err(map_idempotency_key_error(IdempotencyKeyValidationError::EmptyKey)),
        Some(value) => value
            .to_str()
            .map_err(|_| map_idempotency_key_error(IdempotencyKeyValidationError::InvalidEncoding))?,
    };
    IdempotencyKey::new(raw).map_err(map_idempotency_key_error)
}

fn map_idempotency_key_error(err: IdempotencyKeyValidationError) -> Error {
    match err {
        IdempotencyKeyValidationError::EmptyKey => {
            Error::invalid_request("Missing Idempotency-Key header")
        }
        IdempotencyKeyValidationError::InvalidEncoding => {
            Error::invalid_request("Invalid Idempotency-Key header")
        }
    }
}
