//! Integration tests for the sync pipeline against a mock Garmin Connect API

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mileage_cli::client::{ConnectClient, Session};
use mileage_cli::config::Credentials;
use mileage_cli::store::Database;
use mileage_cli::sync::{SyncEngine, SyncOptions};
use mileage_cli::MileageError;

const ACTIVITIES_PATH: &str = "/activitylist-service/activities/search/activities";

fn test_credentials() -> Credentials {
    Credentials {
        email: "runner@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

fn running_activity(id: i64, start: &str, distance_m: f64) -> Value {
    json!({
        "activityId": id,
        "activityName": "Morning Run",
        "activityType": {"typeKey": "running", "typeId": 1},
        "distance": distance_m,
        "startTimeGMT": start,
    })
}

/// Fast options so tests don't sit out the courtesy delay
fn test_options() -> SyncOptions {
    SyncOptions {
        page_delay: Duration::ZERO,
        page_size: 100,
        ..SyncOptions::default()
    }
}

async fn mount_signin(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-access-token"
        })))
        .mount(server)
        .await;
}

async fn login(server: &MockServer) -> (ConnectClient, Session) {
    let client = ConnectClient::new_with_base_url(&server.uri());
    let session = client
        .login(&test_credentials())
        .await
        .expect("login should succeed");
    (client, session)
}

async fn mount_page(server: &MockServer, start: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path(ACTIVITIES_PATH))
        .and(query_param("start", start.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signin"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = ConnectClient::new_with_base_url(&server.uri());
    let err = client.login(&test_credentials()).await.unwrap_err();
    assert!(matches!(err, MileageError::Authentication(_)));
}

#[tokio::test]
async fn test_pagination_stops_on_empty_page() {
    let server = MockServer::start().await;
    mount_signin(&server).await;

    let page1: Vec<Value> = (0..100)
        .map(|i| running_activity(i, "2024-03-04 06:00:00", 5000.0))
        .collect();
    let page2: Vec<Value> = (100..200)
        .map(|i| running_activity(i, "2024-03-05 06:00:00", 5000.0))
        .collect();

    mount_page(&server, 0, json!(page1)).await;
    mount_page(&server, 100, json!(page2)).await;
    mount_page(&server, 200, json!([])).await;

    let (client, session) = login(&server).await;
    let db = Database::open_in_memory().unwrap();
    let mut engine = SyncEngine::with_options(client, session, db, test_options());

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.pages, 3);
    assert_eq!(stats.fetched, 200);
    assert_eq!(stats.accepted, 200);
    assert_eq!(stats.inserted, 200);

    // the .expect(1) on each page mock verifies no fourth request was made
    server.verify().await;
}

#[tokio::test]
async fn test_non_running_activities_are_filtered() {
    let server = MockServer::start().await;
    mount_signin(&server).await;

    mount_page(
        &server,
        0,
        json!([
            running_activity(1, "2024-03-04 06:00:00", 5000.0),
            {
                "activityId": 2,
                "activityType": {"typeKey": "cycling"},
                "distance": 40000.0,
                "startTimeGMT": "2024-03-04 07:00:00",
            },
            {
                "activityId": 3,
                "activityType": "treadmill_running",
                "distance": 3000.0,
                "startTimeGMT": "2024-03-04T08:00:00Z",
            },
        ]),
    )
    .await;
    mount_page(&server, 100, json!([])).await;

    let (client, session) = login(&server).await;
    let db = Database::open_in_memory().unwrap();
    let mut engine = SyncEngine::with_options(client, session, db, test_options());

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.fetched, 3);
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.inserted, 2);
    assert_eq!(engine.database().count().unwrap(), 2);
}

#[tokio::test]
async fn test_invalid_records_are_skipped_not_fatal() {
    let server = MockServer::start().await;
    mount_signin(&server).await;

    mount_page(
        &server,
        0,
        json!([
            // zero distance
            running_activity(1, "2024-03-04 06:00:00", 0.0),
            // malformed timestamp
            running_activity(2, "not-a-timestamp", 5000.0),
            // unexpected activityType shape
            {"activityId": 3, "activityType": 42, "distance": 5000.0},
            // the one good record
            running_activity(4, "2024-03-04 09:00:00", 5000.0),
        ]),
    )
    .await;
    mount_page(&server, 100, json!([])).await;

    let (client, session) = login(&server).await;
    let db = Database::open_in_memory().unwrap();
    let mut engine = SyncEngine::with_options(client, session, db, test_options());

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.accepted, 1);
    assert_eq!(engine.database().count().unwrap(), 1);
}

#[tokio::test]
async fn test_second_run_inserts_nothing() {
    let server = MockServer::start().await;
    mount_signin(&server).await;

    // same upstream data for both runs
    Mock::given(method("GET"))
        .and(path(ACTIVITIES_PATH))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            running_activity(1, "2024-03-04 06:00:00", 5000.0),
            running_activity(2, "2024-03-05 06:00:00", 8000.0),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACTIVITIES_PATH))
        .and(query_param("start", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (client, session) = login(&server).await;
    let db = Database::open_in_memory().unwrap();
    let mut engine = SyncEngine::with_options(client, session, db, test_options());

    let first = engine.run().await.unwrap();
    assert_eq!(first.inserted, 2);

    let second = engine.run().await.unwrap();
    assert_eq!(second.accepted, 2);
    assert_eq!(second.inserted, 0);
    assert_eq!(engine.database().count().unwrap(), 2);
}

#[tokio::test]
async fn test_page_failure_keeps_partial_results() {
    let server = MockServer::start().await;
    mount_signin(&server).await;

    mount_page(
        &server,
        0,
        json!([running_activity(1, "2024-03-04 06:00:00", 5000.0)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(ACTIVITIES_PATH))
        .and(query_param("start", "100"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (client, session) = login(&server).await;
    let db = Database::open_in_memory().unwrap();
    let mut engine = SyncEngine::with_options(client, session, db, test_options());

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.inserted, 1);
    assert_eq!(engine.database().count().unwrap(), 1);
}

#[tokio::test]
async fn test_max_pages_bound_stops_misbehaving_source() {
    let server = MockServer::start().await;
    mount_signin(&server).await;

    // source never returns an empty page
    Mock::given(method("GET"))
        .and(path(ACTIVITIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            running_activity(1, "2024-03-04 06:00:00", 5000.0)
        ])))
        .mount(&server)
        .await;

    let (client, session) = login(&server).await;
    let db = Database::open_in_memory().unwrap();
    let options = SyncOptions {
        max_pages: 3,
        ..test_options()
    };
    let mut engine = SyncEngine::with_options(client, session, db, options);

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.pages, 3);
    assert_eq!(stats.fetched, 3);
    assert_eq!(stats.inserted, 1);
}

#[tokio::test]
async fn test_start_date_bound_drops_old_activities() {
    let server = MockServer::start().await;
    mount_signin(&server).await;

    mount_page(
        &server,
        0,
        json!([
            running_activity(1, "2019-12-31 06:00:00", 5000.0),
            running_activity(2, "2020-01-01 06:00:00", 5000.0),
        ]),
    )
    .await;
    mount_page(&server, 100, json!([])).await;

    let (client, session) = login(&server).await;
    let db = Database::open_in_memory().unwrap();
    let options = SyncOptions {
        start_date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        ..test_options()
    };
    let mut engine = SyncEngine::with_options(client, session, db, options);

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.accepted, 1);
    assert_eq!(engine.database().count().unwrap(), 1);
}

#[tokio::test]
async fn test_synced_data_feeds_aggregation() {
    let server = MockServer::start().await;
    mount_signin(&server).await;

    mount_page(
        &server,
        0,
        json!([
            running_activity(1, "2024-01-31 10:00:00", 2000.0),
            running_activity(2, "2024-02-01 10:00:00", 3000.0),
        ]),
    )
    .await;
    mount_page(&server, 100, json!([])).await;

    let (client, session) = login(&server).await;
    let db = Database::open_in_memory().unwrap();
    let mut engine = SyncEngine::with_options(client, session, db, test_options());
    engine.run().await.unwrap();

    let now = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
    let monthly = mileage_cli::stats::monthly_stats(engine.database(), now).unwrap();
    assert_eq!(monthly.current_month, 3.0);
    assert_eq!(monthly.previous_month, 2.0);
}
