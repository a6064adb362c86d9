//! Behaviour of the send-email state machine against mocked ports.

use std::sync::Arc;
use std::time::Duration;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    DeliveryReceipt, MockEmailDispatcher, MockIdempotencyMetrics, MockIdempotencyStore,
};
use crate::domain::{ErrorCode, FingerprintPolicy, IdempotencyKey};

const TTL: Duration = Duration::from_secs(86_400);

fn email() -> OutboundEmail {
    OutboundEmail {
        from: "Info <info@b3pay.net>".into(),
        to: "a@x.com".into(),
        subject: "Hi".into(),
        html: "<p>hi</p>".into(),
    }
}

fn request(key: &str) -> SendEmailRequest {
    SendEmailRequest {
        idempotency_key: IdempotencyKey::new(key).expect("valid key"),
        body: br#"{"to":"a@x.com","subject":"Hi","html":"<p>hi</p>"}"#.to_vec(),
        email: email(),
    }
}

fn fingerprint(key: &str) -> RequestFingerprint {
    KeyDeriver::default().derive(&IdempotencyKey::new(key).expect("valid key"), b"")
}

fn completed_response(id: &str) -> SendEmailResponse {
    SendEmailResponse {
        id: id.into(),
        status: RecordStatus::Completed,
        to: "a@x.com".into(),
        subject: "Hi".into(),
    }
}

fn config(store: MockIdempotencyStore) -> GatewayConfig {
    GatewayConfig {
        credential: ProviderCredential::new("re_test"),
        store: Some(Arc::new(store)),
        deriver: KeyDeriver::default(),
        idempotency: IdempotencyConfig::default(),
    }
}

#[fixture]
fn in_flight() -> Arc<InFlightSet> {
    Arc::new(InFlightSet::new())
}

fn service(
    store: MockIdempotencyStore,
    dispatcher: MockEmailDispatcher,
    in_flight: &Arc<InFlightSet>,
) -> SendEmailService {
    SendEmailService::new(config(store), Arc::new(dispatcher), Arc::clone(in_flight))
}

fn accepting_dispatcher(times: usize) -> MockEmailDispatcher {
    let mut dispatcher = MockEmailDispatcher::new();
    dispatcher
        .expect_deliver()
        .withf(|credential, email| credential.expose() == "re_test" && email.to == "a@x.com")
        .times(times)
        .returning(|_, _| {
            Ok(DeliveryReceipt {
                provider_id: Some("re_msg_1".into()),
            })
        });
    dispatcher
}

fn idle_dispatcher() -> MockEmailDispatcher {
    let mut dispatcher = MockEmailDispatcher::new();
    dispatcher.expect_deliver().times(0);
    dispatcher
}

#[rstest]
#[tokio::test]
async fn unseen_key_dispatches_once_and_persists_completed(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store
        .expect_get()
        .with(eq(fingerprint("abc123")))
        .times(1)
        .return_once(|_| Ok(None));
    store
        .expect_put()
        .withf(|fp, record, ttl| {
            fp.as_str() == "abc123"
                && record == &IdempotencyRecord::completed(completed_response("abc123"))
                && *ttl == TTL
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));

    let outcome = service(store, accepting_dispatcher(1), &in_flight)
        .send(request("abc123"))
        .await
        .expect("send succeeds");

    assert_eq!(
        outcome,
        SendEmailOutcome::Completed {
            response: completed_response("abc123"),
            replayed: false,
        }
    );
    assert!(in_flight.is_empty());
}

#[rstest]
#[tokio::test]
async fn completed_record_is_replayed_without_dispatch(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store
        .expect_get()
        .times(1)
        .return_once(|_| Ok(Some(IdempotencyRecord::completed(completed_response("abc123")))));
    store.expect_put().times(0);

    let outcome = service(store, idle_dispatcher(), &in_flight)
        .send(request("abc123"))
        .await
        .expect("replay succeeds");

    assert_eq!(
        outcome,
        SendEmailOutcome::Completed {
            response: completed_response("abc123"),
            replayed: true,
        }
    );
}

#[rstest]
#[tokio::test]
async fn bare_completed_status_is_replayed_from_request(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store
        .expect_get()
        .times(1)
        .return_once(|_| Ok(Some(IdempotencyRecord::decode("completed").expect("legacy"))));

    let outcome = service(store, idle_dispatcher(), &in_flight)
        .send(request("abc123"))
        .await
        .expect("replay succeeds");

    assert_eq!(outcome.response(), &completed_response("abc123"));
}

#[rstest]
#[tokio::test]
async fn pending_record_is_dispatched(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store
        .expect_get()
        .times(1)
        .return_once(|_| Ok(Some(IdempotencyRecord::decode("pending").expect("legacy"))));
    store.expect_put().times(1).return_once(|_, _, _| Ok(()));

    let outcome = service(store, accepting_dispatcher(1), &in_flight)
        .send(request("abc123"))
        .await
        .expect("send succeeds");

    assert!(matches!(outcome, SendEmailOutcome::Completed { replayed: false, .. }));
}

#[rstest]
#[tokio::test]
async fn store_read_failure_is_not_treated_as_unseen(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store
        .expect_get()
        .times(1)
        .return_once(|_| Err(IdempotencyStoreError::connection("refused")));
    store.expect_put().times(0);

    let err = service(store, idle_dispatcher(), &in_flight)
        .send(request("abc123"))
        .await
        .expect_err("store failure surfaces");

    assert_eq!(err.code(), ErrorCode::StoreUnavailable);
    assert!(in_flight.is_empty());
}

#[rstest]
#[tokio::test]
async fn dispatch_failure_persists_nothing_and_releases_guard(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store.expect_get().times(1).return_once(|_| Ok(None));
    store.expect_put().times(0);
    let mut dispatcher = MockEmailDispatcher::new();
    dispatcher
        .expect_deliver()
        .times(1)
        .return_once(|_, _| Err(EmailDispatchError::rejected(422_u16, "invalid to")));

    let err = service(store, dispatcher, &in_flight)
        .send(request("abc123"))
        .await
        .expect_err("dispatch failure surfaces");

    assert_eq!(err.code(), ErrorCode::DispatchFailed);
    assert_eq!(
        err.message(),
        "Error sending email: Resend API error: 422 - invalid to"
    );
    assert!(in_flight.is_empty());
}

#[rstest]
#[tokio::test]
async fn store_write_failure_after_delivery_still_completes(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store.expect_get().times(1).return_once(|_| Ok(None));
    store
        .expect_put()
        .times(1)
        .return_once(|_, _, _| Err(IdempotencyStoreError::query("read only replica")));

    let outcome = service(store, accepting_dispatcher(1), &in_flight)
        .send(request("abc123"))
        .await
        .expect("delivery is reported");

    assert_eq!(outcome.response().status, RecordStatus::Completed);
}

#[rstest]
#[tokio::test]
async fn held_fingerprint_reports_in_progress(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store.expect_get().times(0);
    let _held = in_flight.acquire(&fingerprint("abc123")).expect("granted");

    let outcome = service(store, idle_dispatcher(), &in_flight)
        .send(request("abc123"))
        .await
        .expect("in-progress is not an error");

    let SendEmailOutcome::InProgress { response } = outcome else {
        panic!("expected in-progress outcome");
    };
    assert_eq!(response.status, RecordStatus::Pending);
    assert_eq!(response.id, "abc123");
}

#[rstest]
#[tokio::test]
async fn keyed_hash_policy_uses_digest_as_id(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store
        .expect_get()
        .withf(|fp| fp.as_str().len() == 64)
        .times(1)
        .return_once(|_| Ok(None));
    store.expect_put().times(1).return_once(|_, _, _| Ok(()));
    let mut cfg = config(store);
    cfg.deriver = KeyDeriver::new(FingerprintPolicy::KeyedHash, "test:v1");

    let outcome = SendEmailService::new(cfg, Arc::new(accepting_dispatcher(1)), in_flight)
        .send(request("abc123"))
        .await
        .expect("send succeeds");

    assert_ne!(outcome.response().id, "abc123");
    assert!(outcome.response().id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[rstest]
#[case::no_credential(None, true, "Missing RESEND_API_KEY configuration")]
#[case::no_store(ProviderCredential::new("re_test"), false, "Missing IDEMPOTENCY_STORE configuration")]
fn ensure_ready_names_missing_dependency(
    in_flight: Arc<InFlightSet>,
    #[case] credential: Option<ProviderCredential>,
    #[case] with_store: bool,
    #[case] expected: &str,
) {
    let cfg = GatewayConfig {
        credential,
        store: with_store.then(|| Arc::new(MockIdempotencyStore::new()) as Arc<dyn IdempotencyStore>),
        ..GatewayConfig::default()
    };
    let svc = SendEmailService::new(cfg, Arc::new(idle_dispatcher()), in_flight);

    let err = svc.ensure_ready().expect_err("misconfigured");
    assert_eq!(err.code(), ErrorCode::Misconfigured);
    assert_eq!(err.message(), expected);
}

#[rstest]
#[tokio::test]
async fn replay_records_hit_metric(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store
        .expect_get()
        .return_once(|_| Ok(Some(IdempotencyRecord::completed(completed_response("abc123")))));
    let mut metrics = MockIdempotencyMetrics::new();
    metrics
        .expect_record_hit()
        .withf(|labels| labels.policy == "identity")
        .times(1)
        .return_once(|_| Ok(()));
    metrics.expect_record_miss().times(0);

    service(store, idle_dispatcher(), &in_flight)
        .with_metrics(Arc::new(metrics))
        .send(request("abc123"))
        .await
        .expect("replay succeeds");
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicates_dispatch_once(in_flight: Arc<InFlightSet>) {
    let mut store = MockIdempotencyStore::new();
    store.expect_get().returning(|_| Ok(None));
    store.expect_put().returning(|_, _, _| Ok(()));
    let mut dispatcher = MockEmailDispatcher::new();
    dispatcher.expect_deliver().times(1).returning(|_, _| {
        std::thread::sleep(Duration::from_millis(50));
        Ok(DeliveryReceipt::default())
    });
    let svc = Arc::new(service(store, dispatcher, &in_flight));

    let (first, second) = tokio::join!(
        tokio::spawn({
            let svc = Arc::clone(&svc);
            async move { svc.send(request("abc123")).await }
        }),
        tokio::spawn({
            let svc = Arc::clone(&svc);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                svc.send(request("abc123")).await
            }
        }),
    );

    let first = first.expect("task joins").expect("first send");
    let second = second.expect("task joins").expect("second send");
    assert!(matches!(first, SendEmailOutcome::Completed { replayed: false, .. }));
    assert!(matches!(second, SendEmailOutcome::InProgress { .. }));
}
