//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the email submission endpoint, the health probes and
//! the request/response schemas. It is exported with
//! `cargo run --bin openapi-dump` for client generation.

use utoipa::OpenApi;

use crate::domain::{EmailRequest, RecordStatus, SendEmailResponse};

/// OpenAPI document for the gateway.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mail gateway API",
        description = "Idempotent transactional email submission and health probes.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::emails::send_email,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(EmailRequest, SendEmailResponse, RecordStatus)),
    tags(
        (name = "emails", description = "Transactional email submission"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
