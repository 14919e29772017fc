//! End-to-end sweeps against a mocked backend table API.

use std::sync::Arc;

use cadesk_backend::{BackendClient, BackendConfig};
use cadesk_reminders::{
    BackendDeadlineStore, ClaimOutcome, DeadlineStore, LogNotifier, PreferencePolicy,
    ReminderSweep, SkipReason, SweepError,
};
use chrono::{Duration, TimeZone, Utc};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OWNER: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
const FIRST: &str = "11111111-1111-4111-8111-111111111111";
const SECOND: &str = "22222222-2222-4222-8222-222222222222";
const THIRD: &str = "33333333-3333-4333-8333-333333333333";

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 15, 6, 30, 0).unwrap()
}

fn row(id: &str, due_in_days: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("deadline {id}"),
        "category": "GST",
        "due_date": (now() + Duration::days(due_in_days)).to_rfc3339(),
        "priority": "medium",
        "status": "pending",
        "notification_sent": false,
        "owner_id": OWNER,
        "created_at": "2026-06-01T00:00:00Z",
        "updated_at": "2026-06-01T00:00:00Z"
    })
}

fn store(mock_server: &MockServer) -> BackendDeadlineStore {
    let config = BackendConfig::local_mock(&mock_server.uri(), "service-key");
    BackendDeadlineStore::new(BackendClient::new(config).unwrap())
}

async fn mount_selection(mock_server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/compliance_deadlines"))
        .and(query_param("notification_sent", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/notification_preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "owner_id": OWNER,
            "email_notifications": true,
            "reminder_days_before": 3
        }])))
        .mount(mock_server)
        .await;
}

async fn mount_claim(mock_server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/compliance_deadlines"))
        .and(query_param("id", format!("eq.{id}")))
        .respond_with(response)
        .expect(1)
        .mount(mock_server)
        .await;
}

fn claimed(id: &str, due_in_days: i64) -> ResponseTemplate {
    let mut body = row(id, due_in_days);
    body["notification_sent"] = serde_json::json!(true);
    ResponseTemplate::new(200).set_body_json(serde_json::json!([body]))
}

#[tokio::test]
async fn second_row_failure_is_isolated() {
    let mock_server = MockServer::start().await;
    mount_selection(
        &mock_server,
        serde_json::json!([row(FIRST, 1), row(SECOND, 2), row(THIRD, 3)]),
    )
    .await;
    mount_claim(&mock_server, FIRST, claimed(FIRST, 1)).await;
    mount_claim(&mock_server, SECOND, ResponseTemplate::new(500)).await;
    mount_claim(&mock_server, THIRD, claimed(THIRD, 3)).await;

    let sweep = ReminderSweep::new(Arc::new(store(&mock_server)), Arc::new(LogNotifier));
    let report = sweep.run_at(now()).await.unwrap();

    let processed: Vec<String> = report.processed.iter().map(ToString::to_string).collect();
    assert_eq!(processed, vec![FIRST, THIRD]);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(report.skipped[0].reason, SkipReason::ClaimFailed(_)));
}

#[tokio::test]
async fn selection_failure_is_reported() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/compliance_deadlines"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let sweep = ReminderSweep::new(Arc::new(store(&mock_server)), Arc::new(LogNotifier));
    let err = sweep.run_at(now()).await.unwrap_err();
    assert!(matches!(err, SweepError::Selection(_)));
}

#[tokio::test]
async fn lost_claim_is_classified_as_already_claimed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/compliance_deadlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/compliance_deadlines"))
        .and(query_param("id", format!("eq.{FIRST}")))
        .respond_with(claimed(FIRST, 1))
        .mount(&mock_server)
        .await;

    let outcome = store(&mock_server)
        .claim_notified(FIRST.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(outcome, ClaimOutcome::AlreadyClaimed);
}

#[tokio::test]
async fn vanished_row_is_classified_as_missing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/compliance_deadlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/compliance_deadlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let outcome = store(&mock_server)
        .claim_notified(SECOND.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(outcome, ClaimOutcome::Missing);
}

#[tokio::test]
async fn honor_policy_uses_fetched_preferences() {
    let mock_server = MockServer::start().await;
    // Owner asked for 3 days' notice: the 5-day row waits.
    mount_selection(&mock_server, serde_json::json!([row(FIRST, 1), row(SECOND, 5)])).await;
    mount_claim(&mock_server, FIRST, claimed(FIRST, 1)).await;

    let sweep = ReminderSweep::new(Arc::new(store(&mock_server)), Arc::new(LogNotifier))
        .with_policy(PreferencePolicy::Honor);
    let report = sweep.run_at(now()).await.unwrap();

    assert_eq!(report.processed.len(), 1);
    assert_eq!(report.processed[0].to_string(), FIRST);
    assert_eq!(report.skipped[0].reason, SkipReason::Deferred);
}

#[tokio::test]
async fn overlong_title_does_not_stop_the_sweep() {
    let mock_server = MockServer::start().await;
    let mut long = row(SECOND, 2);
    long["title"] = serde_json::json!("x".repeat(201));
    mount_selection(&mock_server, serde_json::json!([row(FIRST, 1), long.clone()])).await;
    mount_claim(&mock_server, FIRST, claimed(FIRST, 1)).await;
    long["notification_sent"] = serde_json::json!(true);
    mount_claim(
        &mock_server,
        SECOND,
        ResponseTemplate::new(200).set_body_json(serde_json::json!([long])),
    )
    .await;

    let sweep = ReminderSweep::new(Arc::new(store(&mock_server)), Arc::new(LogNotifier));
    let report = sweep.run_at(now()).await.unwrap();

    let processed: Vec<String> = report.processed.iter().map(ToString::to_string).collect();
    assert_eq!(processed, vec![FIRST, SECOND]);
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn out_of_order_timestamps_do_not_stop_the_sweep() {
    let mock_server = MockServer::start().await;
    let mut skewed = row(SECOND, 2);
    skewed["created_at"] = serde_json::json!("2026-06-01T00:00:01Z");
    skewed["updated_at"] = serde_json::json!("2026-06-01T00:00:00Z");
    mount_selection(&mock_server, serde_json::json!([row(FIRST, 1), skewed])).await;
    mount_claim(&mock_server, FIRST, claimed(FIRST, 1)).await;
    mount_claim(&mock_server, SECOND, claimed(SECOND, 2)).await;

    let sweep = ReminderSweep::new(Arc::new(store(&mock_server)), Arc::new(LogNotifier));
    let report = sweep.run_at(now()).await.unwrap();

    let processed: Vec<String> = report.processed.iter().map(ToString::to_string).collect();
    assert_eq!(processed, vec![FIRST, SECOND]);
}

#[tokio::test]
async fn undecodable_row_is_skipped_as_malformed() {
    let mock_server = MockServer::start().await;
    let mut broken = row(SECOND, 2);
    broken["status"] = serde_json::json!("archived");
    mount_selection(
        &mock_server,
        serde_json::json!([row(FIRST, 1), broken, row(THIRD, 3)]),
    )
    .await;
    mount_claim(&mock_server, FIRST, claimed(FIRST, 1)).await;
    mount_claim(&mock_server, THIRD, claimed(THIRD, 3)).await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/compliance_deadlines"))
        .and(query_param("id", format!("eq.{SECOND}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let sweep = ReminderSweep::new(Arc::new(store(&mock_server)), Arc::new(LogNotifier));
    let report = sweep.run_at(now()).await.unwrap();

    let processed: Vec<String> = report.processed.iter().map(ToString::to_string).collect();
    assert_eq!(processed, vec![FIRST, THIRD]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id.to_string(), SECOND);
    assert!(matches!(report.skipped[0].reason, SkipReason::Malformed(_)));

    let body = serde_json::to_value(&report).unwrap();
    assert_eq!(body["skipped"][0]["reason"], "malformed");
}

#[tokio::test]
async fn processed_ids_follow_the_backend_order() {
    let mock_server = MockServer::start().await;
    // The backend sorts by due_date; the sweep keeps that order.
    mount_selection(
        &mock_server,
        serde_json::json!([row(THIRD, 1), row(FIRST, 4), row(SECOND, 6)]),
    )
    .await;
    mount_claim(&mock_server, THIRD, claimed(THIRD, 1)).await;
    mount_claim(&mock_server, FIRST, claimed(FIRST, 4)).await;
    mount_claim(&mock_server, SECOND, claimed(SECOND, 6)).await;

    let sweep = ReminderSweep::new(Arc::new(store(&mock_server)), Arc::new(LogNotifier));
    let report = sweep.run_at(now()).await.unwrap();

    let processed: Vec<String> = report.processed.iter().map(ToString::to_string).collect();
    assert_eq!(processed, vec![THIRD, FIRST, SECOND]);
}
