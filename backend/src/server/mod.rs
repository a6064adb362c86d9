//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod settings;

pub use config::ServerConfig;
pub use settings::GatewaySettings;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use mail_gateway::Trace;
use mail_gateway::domain::ports::SendEmailCommand;
use mail_gateway::domain::{InFlightSet, SendEmailService};
use mail_gateway::inbound::http::cors::cors_headers;
use mail_gateway::inbound::http::emails::gateway_entry;
use mail_gateway::inbound::http::health::{HealthState, live, ready};
use mail_gateway::inbound::http::state::HttpState;
#[cfg(feature = "metrics")]
use mail_gateway::outbound::metrics::PrometheusIdempotencyMetrics;

use std::sync::Arc;

/// Build the send-email service from the resolved configuration.
///
/// The in-flight set is created here, once per process, and shared by every
/// worker. With the metrics feature enabled and a Prometheus registry
/// available, idempotency outcomes are exported; otherwise they are dropped.
///
/// # Errors
/// Returns [`std::io::Error`] if Prometheus metric registration fails.
fn build_send_email_service(config: &ServerConfig) -> std::io::Result<Arc<dyn SendEmailCommand>> {
    let service = SendEmailService::new(
        config.gateway.clone(),
        Arc::clone(&config.dispatcher),
        Arc::new(InFlightSet::new()),
    );

    #[cfg(feature = "metrics")]
    let service = match &config.prometheus {
        Some(prom) => {
            let metrics = PrometheusIdempotencyMetrics::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("idempotency metrics registration failed: {e}"))
            })?;
            service.with_metrics(Arc::new(metrics))
        }
        None => service,
    };

    Ok(Arc::new(service))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(cors_headers())
        .wrap(Trace)
        .service(ready)
        .service(live)
        .default_service(web::route().to(gateway_entry))
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] with the gateway dependencies and bind address.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let send_email = build_send_email_service(&config)?;
    let http_state =
        web::Data::new(HttpState::new(send_email).with_default_sender(config.default_sender));
    let bind_addr = config.bind_addr;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(config.prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
