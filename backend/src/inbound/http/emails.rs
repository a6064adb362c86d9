//! Email submission endpoint.
//!
//! ```text
//! OPTIONS *  CORS preflight
//! POST    /  Send a transactional email, at most once per Idempotency-Key
//! ```
//!
//! The gateway answers on any path, so [`gateway_entry`] is mounted as the
//! application's default service and dispatches on the method.

use actix_web::http::Method;
use actix_web::http::header::RETRY_AFTER;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::domain::ports::{SendEmailOutcome, SendEmailRequest};
use crate::domain::{EmailRequest, SendEmailResponse};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cors::preflight;
use crate::inbound::http::idempotency::extract_idempotency_key;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ensure_json_post, parse_email_request};

/// Seconds a client is asked to wait before retrying an in-flight key.
const RETRY_AFTER_SECS: &str = "1";

/// Entry point for every request that is not a health probe.
pub async fn gateway_entry(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    if *req.method() == Method::OPTIONS {
        return Ok(preflight());
    }
    send_email(req, body, state).await
}

/// Send a transactional email.
///
/// Checks run in a fixed order and each failure short-circuits without
/// touching idempotency state: method and content type, service
/// configuration, `Idempotency-Key`, JSON decoding, required fields.
#[utoipa::path(
    post,
    path = "/",
    request_body = EmailRequest,
    params(
        ("Idempotency-Key" = String, Header, description = "Client key scoping retries"),
    ),
    responses(
        (status = 200, description = "Email delivered or replayed", body = SendEmailResponse),
        (status = 202, description = "Same key is still being processed", body = SendEmailResponse),
        (status = 400, description = "Malformed request", body = String, content_type = "text/plain"),
        (status = 500, description = "Misconfiguration, store or provider failure", body = String, content_type = "text/plain"),
    ),
    tags = ["emails"],
    operation_id = "sendEmail",
    security([]),
)]
pub async fn send_email(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    ensure_json_post(req.method(), req.headers())?;
    state.send_email.ensure_ready()?;
    let idempotency_key = extract_idempotency_key(req.headers())?;
    let email = parse_email_request(&body, &state.default_sender)?;

    let outcome = state
        .send_email
        .send(SendEmailRequest {
            idempotency_key,
            body: body.to_vec(),
            email,
        })
        .await?;

    Ok(match outcome {
        SendEmailOutcome::Completed { response, .. } => HttpResponse::Ok().json(response),
        SendEmailOutcome::InProgress { response } => HttpResponse::Accepted()
            .insert_header((RETRY_AFTER, RETRY_AFTER_SECS))
            .json(response),
    })
}
