//! Integration tests for the relay dispatcher.
//!
//! Uses a mock HTTP endpoint to verify at-least-once semantics: nothing is
//! marked sent without a 2xx, nothing is lost while endpoints are down or
//! disabled, and one failure never blocks the rest of the queue.

use std::sync::Arc;

use chrono::Utc;
use sift_core::{ContentId, ContentRecord, Outcome, RelayChannel, SystemClock};
use sift_relay::{Dispatcher, DispatcherConfig};
use sift_testing::{ContentBuilder, EndpointBuilder, TestEnv};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn dispatcher_for(env: &TestEnv) -> Dispatcher {
    Dispatcher::new(env.storage().clone(), DispatcherConfig::default(), Arc::new(SystemClock::new()))
        .expect("dispatcher")
}

/// Seeds a resolved record plus its delivery obligation, the way a
/// moderation decision leaves the store.
async fn seed_obligation(env: &TestEnv, outcome: Outcome, title: &str) -> ContentId {
    let record: ContentRecord = ContentBuilder::new().title(title).build();

    let storage = env.storage();
    let mut tx = storage.pool().begin().await.expect("begin");
    storage
        .content
        .insert_in_tx(&mut tx, outcome.partition(), &record)
        .await
        .expect("insert content");
    storage
        .relay_ledger
        .record_in_tx(&mut tx, record.id, outcome, Utc::now())
        .await
        .expect("record obligation");
    tx.commit().await.expect("commit");

    record.id
}

async fn enable_endpoint(env: &TestEnv, channel: RelayChannel, url: String) {
    let endpoint = EndpointBuilder::new(channel).url(url).build();
    env.storage().endpoints.upsert(&endpoint).await.expect("upsert endpoint");
}

#[tokio::test]
async fn successful_delivery_marks_obligation_sent() {
    let env = TestEnv::new().await.expect("test env");
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/hook"))
        .and(matchers::body_partial_json(serde_json::json!({
            "title": "fresh story",
            "event": "approved",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    seed_obligation(&env, Outcome::Approved, "fresh story").await;
    enable_endpoint(&env, RelayChannel::on_approve(), format!("{}/hook", server.uri())).await;

    let stats = dispatcher_for(&env).sweep().await.expect("sweep");
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.failed, 0);

    let pending = env.storage().relay_ledger.pending(Outcome::Approved).await.expect("pending");
    assert!(pending.is_empty(), "obligation completed");

    server.verify().await;
}

#[tokio::test]
async fn failed_delivery_retains_obligation_until_success() {
    let env = TestEnv::new().await.expect("test env");
    let server = MockServer::start().await;

    // The endpoint fails twice, then recovers. Mount order matters: the
    // failing mock is consumed first.
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let content_id = seed_obligation(&env, Outcome::Rejected, "stubborn").await;
    enable_endpoint(&env, RelayChannel::on_reject(), format!("{}/hook", server.uri())).await;

    let dispatcher = dispatcher_for(&env);

    for attempt in 0..2 {
        let stats = dispatcher.sweep().await.expect("sweep");
        assert_eq!(stats.failed, 1, "attempt {attempt} must fail");
        assert_eq!(stats.delivered, 0);

        let pending =
            env.storage().relay_ledger.pending(Outcome::Rejected).await.expect("pending");
        assert_eq!(pending.len(), 1, "obligation survives failed attempt {attempt}");
        assert_eq!(pending[0].content_id, content_id);
    }

    // Third pass observes the recovered endpoint.
    let stats = dispatcher.sweep().await.expect("sweep");
    assert_eq!(stats.delivered, 1);

    let entry =
        &env.storage().relay_ledger.for_content(content_id).await.expect("ledger")[0];
    assert!(entry.sent_at.is_some(), "only the successful attempt sets sent_at");
}

#[tokio::test]
async fn no_enabled_endpoint_leaves_backlog_untouched() {
    let env = TestEnv::new().await.expect("test env");

    seed_obligation(&env, Outcome::Approved, "waiting").await;

    let dispatcher = dispatcher_for(&env);

    // Nothing configured at all.
    let stats = dispatcher.sweep().await.expect("sweep");
    assert_eq!(stats.awaiting_endpoint, 1);
    assert_eq!(stats.delivered + stats.failed, 0);

    // Configured but disabled is the same: not actionable yet.
    let disabled =
        EndpointBuilder::new(RelayChannel::on_approve()).enabled(false).build();
    env.storage().endpoints.upsert(&disabled).await.expect("upsert");

    let stats = dispatcher.sweep().await.expect("sweep");
    assert_eq!(stats.awaiting_endpoint, 1);

    let pending = env.storage().relay_ledger.pending(Outcome::Approved).await.expect("pending");
    assert_eq!(pending.len(), 1, "backlog retained for later enablement");
}

#[tokio::test]
async fn enabling_an_endpoint_later_drains_the_backlog() {
    let env = TestEnv::new().await.expect("test env");
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    seed_obligation(&env, Outcome::Approved, "first").await;
    seed_obligation(&env, Outcome::Approved, "second").await;

    let dispatcher = dispatcher_for(&env);
    let stats = dispatcher.sweep().await.expect("sweep");
    assert_eq!(stats.awaiting_endpoint, 2);

    enable_endpoint(&env, RelayChannel::on_approve(), format!("{}/hook", server.uri())).await;

    let stats = dispatcher.sweep().await.expect("sweep");
    assert_eq!(stats.delivered, 2, "accrued backlog delivered once enabled");

    server.verify().await;
}

#[tokio::test]
async fn one_failure_does_not_block_the_remaining_queue() {
    let env = TestEnv::new().await.expect("test env");
    let server = MockServer::start().await;

    // First request of the pass fails, the rest succeed. Oldest-first
    // ordering means the failing response lands on the older obligation.
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let older = seed_obligation(&env, Outcome::Approved, "older").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = seed_obligation(&env, Outcome::Approved, "newer").await;

    enable_endpoint(&env, RelayChannel::on_approve(), format!("{}/hook", server.uri())).await;

    let stats = dispatcher_for(&env).sweep().await.expect("sweep");
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.delivered, 1);

    let ledger = env.storage().relay_ledger.clone();
    assert!(ledger.for_content(older).await.expect("ledger")[0].is_unsent());
    assert!(ledger.for_content(newer).await.expect("ledger")[0].sent_at.is_some());
}

#[tokio::test]
async fn outcomes_route_to_their_own_channels() {
    let env = TestEnv::new().await.expect("test env");
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/approvals"))
        .and(matchers::body_partial_json(serde_json::json!({"event": "approved"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/rejections"))
        .and(matchers::body_partial_json(serde_json::json!({"event": "rejected"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    seed_obligation(&env, Outcome::Approved, "good").await;
    seed_obligation(&env, Outcome::Rejected, "bad").await;

    enable_endpoint(&env, RelayChannel::on_approve(), format!("{}/approvals", server.uri())).await;
    enable_endpoint(&env, RelayChannel::on_reject(), format!("{}/rejections", server.uri())).await;

    let stats = dispatcher_for(&env).sweep().await.expect("sweep");
    assert_eq!(stats.delivered, 2);

    server.verify().await;
}

#[tokio::test]
async fn unreachable_endpoint_is_a_retained_failure_not_a_crash() {
    let env = TestEnv::new().await.expect("test env");

    seed_obligation(&env, Outcome::Approved, "nowhere to go").await;
    // Port 1 refuses connections.
    enable_endpoint(&env, RelayChannel::on_approve(), "http://127.0.0.1:1/hook".to_string()).await;

    let stats = dispatcher_for(&env).sweep().await.expect("sweep must not error");
    assert_eq!(stats.failed, 1);

    let pending = env.storage().relay_ledger.pending(Outcome::Approved).await.expect("pending");
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn background_sweeper_delivers_and_stops_on_cancel() {
    let env = TestEnv::new().await.expect("test env");
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    seed_obligation(&env, Outcome::Approved, "background").await;
    enable_endpoint(&env, RelayChannel::on_approve(), format!("{}/hook", server.uri())).await;

    let token = tokio_util::sync::CancellationToken::new();
    let sweeper = sift_relay::Sweeper::new(
        Arc::new(dispatcher_for(&env)),
        std::time::Duration::from_millis(10),
        token.clone(),
    );
    let handle = tokio::spawn(sweeper.run());

    // Wait until a pass has drained the backlog.
    for _ in 0..50 {
        if env.storage().relay_ledger.pending(Outcome::Approved).await.expect("pending").is_empty()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(
        env.storage().relay_ledger.pending(Outcome::Approved).await.expect("pending").is_empty(),
        "background pass delivers the obligation"
    );

    token.cancel();
    handle.await.expect("sweeper task ends after cancellation");
}

#[tokio::test]
async fn sweep_delivers_obligations_created_by_real_decisions() {
    let env = TestEnv::new().await.expect("test env");
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::body_partial_json(serde_json::json!({
            "title": "end to end",
            "event": "approved",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let record = ContentBuilder::new().title("end to end").build();
    env.storage().content.insert_pending(&record).await.expect("insert");

    let engine = sift_moderation::ModerationEngine::new(
        env.storage().clone(),
        Arc::new(SystemClock::new()),
    );
    engine.approve(record.id).await.expect("approve");

    enable_endpoint(&env, RelayChannel::on_approve(), format!("{}/hook", server.uri())).await;

    let stats = dispatcher_for(&env).sweep().await.expect("sweep");
    assert_eq!(stats.delivered, 1);

    let entry = &env.storage().relay_ledger.for_content(record.id).await.expect("ledger")[0];
    assert!(entry.sent_at.is_some());

    server.verify().await;
}
