//! End-to-end HTTP tests for the gateway with in-memory adapters.
//!
//! The app is wired the way the server wires it: CORS default headers,
//! request tracing and the catch-all gateway entry.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test as actix_test, web};
use mail_gateway::Trace;
use mail_gateway::domain::ports::IdempotencyStore;
use mail_gateway::domain::{GatewayConfig, InFlightSet, ProviderCredential, SendEmailService};
use mail_gateway::inbound::http::cors::cors_headers;
use mail_gateway::inbound::http::emails::gateway_entry;
use mail_gateway::inbound::http::state::HttpState;
use mail_gateway::outbound::store::InMemoryIdempotencyStore;
use mail_gateway::test_support::RecordingDispatcher;
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

struct Gateway {
    dispatcher: Arc<RecordingDispatcher>,
    store: Arc<InMemoryIdempotencyStore>,
    state: HttpState,
}

fn gateway(credential: Option<&str>) -> Gateway {
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let store = Arc::new(InMemoryIdempotencyStore::new(Arc::new(DefaultClock)));
    let config = GatewayConfig {
        credential: credential.and_then(ProviderCredential::new),
        store: Some(Arc::clone(&store) as Arc<dyn IdempotencyStore>),
        ..GatewayConfig::default()
    };
    let service = SendEmailService::new(
        config,
        dispatcher.clone(),
        Arc::new(InFlightSet::new()),
    );
    Gateway {
        dispatcher,
        store,
        state: HttpState::new(Arc::new(service)),
    }
}

fn gateway_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(cors_headers())
        .wrap(Trace)
        .default_service(web::route().to(gateway_entry))
}

fn submit(key: Option<&str>, body: &Value) -> actix_test::TestRequest {
    let req = actix_test::TestRequest::post().uri("/").set_json(body);
    match key {
        Some(key) => req.insert_header(("Idempotency-Key", key)),
        None => req,
    }
}

fn valid_body() -> Value {
    json!({"to": "a@x.com", "subject": "Hi", "html": "<p>hi</p>"})
}

fn assert_cors(res: &ServiceResponse) {
    let origin = res
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok());
    assert_eq!(origin, Some("*"));
}

#[actix_web::test]
async fn first_submission_and_replay_return_the_same_body() {
    let gw = gateway(Some("re_test"));
    let app = actix_test::init_service(gateway_app(gw.state.clone())).await;

    let req = submit(Some("abc123"), &valid_body()).to_request();
    let first = actix_test::call_service(&app, req).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_cors(&first);
    let first: Value = actix_test::read_body_json(first).await;
    assert_eq!(
        first,
        json!({"id": "abc123", "status": "completed", "to": "a@x.com", "subject": "Hi"})
    );

    let req = submit(Some("abc123"), &valid_body()).to_request();
    let replay = actix_test::call_service(&app, req).await;
    assert_eq!(replay.status(), StatusCode::OK);
    let replay: Value = actix_test::read_body_json(replay).await;
    assert_eq!(replay, first);
    assert_eq!(gw.dispatcher.attempts(), 1);
}

#[rstest]
#[case::missing_key(None, valid_body(), "Missing Idempotency-Key header")]
#[case::empty_to(
    Some("abc123"),
    json!({"to": "", "subject": "Hi", "html": "<p>hi</p>"}),
    "Missing required fields in request body"
)]
#[actix_web::test]
async fn invalid_submissions_are_rejected_without_dispatch(
    #[case] key: Option<&str>,
    #[case] body: Value,
    #[case] message: &str,
) {
    let gw = gateway(Some("re_test"));
    let app = actix_test::init_service(gateway_app(gw.state.clone())).await;

    let res = actix_test::call_service(&app, submit(key, &body).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_cors(&res);
    let text = actix_test::read_body(res).await;
    assert_eq!(text, message.as_bytes());
    assert_eq!(gw.dispatcher.attempts(), 0);
    assert!(gw.store.is_empty());
}

#[actix_web::test]
async fn wrong_content_type_is_rejected() {
    let gw = gateway(Some("re_test"));
    let app = actix_test::init_service(gateway_app(gw.state.clone())).await;
    let req = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("Idempotency-Key", "abc123"))
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("hello")
        .to_request();

    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let text = actix_test::read_body(res).await;
    assert!(text.starts_with(b"Invalid request method or content type POST - text/plain"));
}

#[actix_web::test]
async fn preflight_returns_no_content_with_cors_headers() {
    let gw = gateway(Some("re_test"));
    let app = actix_test::init_service(gateway_app(gw.state.clone())).await;
    let req = actix_test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/")
        .to_request();

    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_cors(&res);
    let methods = res
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok());
    assert_eq!(methods, Some("POST, OPTIONS"));
}

#[actix_web::test]
async fn missing_credential_is_reported_as_server_error() {
    let gw = gateway(None);
    let app = actix_test::init_service(gateway_app(gw.state.clone())).await;

    let req = submit(Some("abc123"), &valid_body()).to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.headers().contains_key("trace-id"));
    let text = actix_test::read_body(res).await;
    assert_eq!(text, "Missing RESEND_API_KEY configuration".as_bytes());
}

#[actix_web::test]
async fn failed_dispatch_is_retried_on_next_request() {
    let gw = gateway(Some("re_test"));
    gw.dispatcher.fail_next(1);
    let app = actix_test::init_service(gateway_app(gw.state.clone())).await;

    let req = submit(Some("abc123"), &valid_body()).to_request();
    let failed = actix_test::call_service(&app, req).await;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = actix_test::read_body(failed).await;
    assert_eq!(
        text,
        "Error sending email: Resend API error: 500 - provider unavailable".as_bytes()
    );
    assert!(gw.store.is_empty());

    let req = submit(Some("abc123"), &valid_body()).to_request();
    let retried = actix_test::call_service(&app, req).await;
    assert_eq!(retried.status(), StatusCode::OK);
    assert_eq!(gw.dispatcher.attempts(), 2);
    assert_eq!(gw.dispatcher.delivered().len(), 1);
}
