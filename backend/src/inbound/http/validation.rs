//! Request shape checks performed before the domain is involved.

use actix_web::http::Method;
use actix_web::http::header::{CONTENT_TYPE, HeaderMap};

use crate::domain::{EmailRequest, Error, OutboundEmail};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Require `POST` with a `Content-Type` of exactly `application/json`.
///
/// # Errors
///
/// Returns an invalid-request error naming the received method and content
/// type (`null` when the header is absent).
pub fn ensure_json_post(method: &Method, headers: &HeaderMap) -> Result<(), Error> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if *method == Method::POST && content_type == Some(JSON_CONTENT_TYPE) {
        return Ok(());
    }
    Err(Error::invalid_request(format!(
        "Invalid request method or content type {method} - {}, expected POST - application/json",
        content_type.unwrap_or("null"),
    )))
}

/// Decode the body and check the required fields.
///
/// # Errors
///
/// Malformed JSON and missing fields produce distinct invalid-request errors.
pub fn parse_email_request(body: &[u8], default_sender: &str) -> Result<OutboundEmail, Error> {
    let request: EmailRequest = serde_json::from_slice(body)
        .map_err(|_| Error::invalid_request("Invalid JSON in request body"))?;
    request
        .validate(default_sender)
        .map_err(|_| Error::invalid_request("Missing required fields in request body"))
}
