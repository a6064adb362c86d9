//! Cross-origin headers applied to every gateway response.

use actix_web::HttpResponse;
use actix_web::middleware::DefaultHeaders;

/// `Access-Control-Allow-Origin` value.
pub const ALLOW_ORIGIN: &str = "*";
/// `Access-Control-Allow-Methods` value.
pub const ALLOW_METHODS: &str = "POST, OPTIONS";
/// `Access-Control-Allow-Headers` value.
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, Idempotency-Key";

/// Middleware adding the CORS headers to every response, errors included.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use mail_gateway::inbound::http::cors::cors_headers;
///
/// let _app = App::new().wrap(cors_headers());
/// ```
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", ALLOW_ORIGIN))
        .add(("Access-Control-Allow-Methods", ALLOW_METHODS))
        .add(("Access-Control-Allow-Headers", ALLOW_HEADERS))
}

/// Empty answer to a CORS preflight.
pub fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
