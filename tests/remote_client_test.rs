//! Integration tests for HttpAuthority using wiremock
//!
//! These tests validate the wire contract with the reservation server.

mod common;

use serde_json::json;
use std::time::Duration;
use tablebook::models::{AvailabilityQuery, BookingRequest};
use tablebook::remote::{ClientConfig, HttpAuthority, ReservationAuthority};
use tablebook::utils::error::RemoteError;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn booking_request() -> BookingRequest {
    BookingRequest {
        name: "A".to_string(),
        email: "a@b.com".to_string(),
        phone: "555".to_string(),
        party_size: 4,
        date: common::open_date(),
        time: "18:30".to_string(),
        duration_slots: 1,
    }
}

/// Availability sends the query parameters and returns times in server order
#[tokio::test]
async fn test_availability_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/availability"))
        .and(query_param("date", "2025-03-10"))
        .and(query_param("partySize", "4"))
        .and(query_param("durationSlots", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "slots": ["19:00", "18:00"] })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    let query = AvailabilityQuery::new(common::open_date(), 4, 2);
    let times = authority.availability(&query).await.unwrap();

    assert_eq!(times, vec!["19:00", "18:00"]);
}

/// A body without a slots array reads as no availability
#[tokio::test]
async fn test_availability_missing_slots_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    let query = AvailabilityQuery::new(common::open_date(), 2, 1);

    assert!(authority.availability(&query).await.unwrap().is_empty());
}

/// Server errors on availability are retried when retries are configured
#[tokio::test]
async fn test_availability_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/availability"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "slots": ["18:00"] })))
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(mock_server.uri())
        .with_retry_count(2)
        .with_retry_delay(Duration::from_millis(10));
    let authority = HttpAuthority::new(config).unwrap();
    let query = AvailabilityQuery::new(common::open_date(), 2, 1);

    assert_eq!(authority.availability(&query).await.unwrap(), vec!["18:00"]);
}

/// Client errors are never retried
#[tokio::test]
async fn test_availability_400_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/availability"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "Bad date" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(mock_server.uri())
        .with_retry_count(3)
        .with_retry_delay(Duration::from_millis(10));
    let authority = HttpAuthority::new(config).unwrap();
    let query = AvailabilityQuery::new(common::open_date(), 2, 1);

    let err = authority.availability(&query).await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Http {
            status: 400,
            message: "Bad date".to_string()
        }
    );
}

/// Booking creation posts the camelCase request body
#[tokio::test]
async fn test_create_reservation_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/reservations"))
        .and(body_partial_json(json!({
            "name": "A",
            "partySize": 4,
            "date": "2025-03-10",
            "time": "18:30",
            "durationSlots": 1
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "r1",
            "name": "A",
            "partySize": 4,
            "date": "2025-03-10",
            "time": "18:30"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    let created = authority
        .create_reservation(&booking_request())
        .await
        .unwrap();

    assert_eq!(created.map(|r| r.id), Some("r1".to_string()));
}

/// A success body that is not a reservation is still a success
#[tokio::test]
async fn test_create_reservation_opaque_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    let created = authority
        .create_reservation(&booking_request())
        .await
        .unwrap();

    assert!(created.is_none());
}

/// 409 is a conflict carrying the server message
#[tokio::test]
async fn test_create_reservation_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/reservations"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "That time is taken" })),
        )
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    let err = authority
        .create_reservation(&booking_request())
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.server_message(), Some("That time is taken"));
}

/// A "slot full" message is a conflict whatever the status
#[tokio::test]
async fn test_create_reservation_slot_full_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/reservations"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Slot full for 18:30" })),
        )
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    let err = authority
        .create_reservation(&booking_request())
        .await
        .unwrap_err();

    assert!(err.is_conflict());
}

/// Booking creation is never retried, even on server errors
#[tokio::test]
async fn test_create_reservation_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/reservations"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(mock_server.uri())
        .with_retry_count(3)
        .with_retry_delay(Duration::from_millis(10));
    let authority = HttpAuthority::new(config).unwrap();
    let err = authority
        .create_reservation(&booking_request())
        .await
        .unwrap_err();

    assert!(err.is_transient());
}

/// Unreachable servers surface as network errors
#[tokio::test]
async fn test_network_failure() {
    // Nothing listens on port 1
    let authority = common::authority("http://127.0.0.1:1");
    let err = authority
        .create_reservation(&booking_request())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Network(_)));
}

/// Listing sends the bearer token and the optional date filter
#[tokio::test]
async fn test_list_reservations_with_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reservations"))
        .and(query_param("date", "2025-03-10"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "_id": "r1",
                "name": "A",
                "email": "a@b.com",
                "phone": "555",
                "partySize": 4,
                "date": "2025-03-10T00:00:00.000Z",
                "time": "6:30 p.m.",
                "createdAt": "2025-03-01T10:00:00.000Z"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    let rows = authority
        .list_reservations("tok", Some(common::open_date()))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "r1");
    assert_eq!(rows[0].party_size, 4);
    assert!(rows[0].created_at.is_some());
}

/// 401 on an authenticated call is Unauthorized
#[tokio::test]
async fn test_list_reservations_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reservations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    let err = authority.list_reservations("stale", None).await.unwrap_err();

    assert_eq!(err, RemoteError::Unauthorized);
}

/// Deletion targets the reservation id with the bearer token
#[tokio::test]
async fn test_delete_reservation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/reservations/r1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    authority.delete_reservation("tok", "r1").await.unwrap();
}

/// Login returns the issued token
#[tokio::test]
async fn test_login_returns_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_partial_json(json!({ "username": "admin", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    assert_eq!(authority.login("admin", "pw").await.unwrap(), "abc");
}

/// Session verification succeeds only on 2xx
#[tokio::test]
async fn test_verify_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "admin" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let authority = common::authority(&mock_server.uri());
    assert!(authority.verify_session("good").await.is_ok());
    assert_eq!(
        authority.verify_session("bad").await.unwrap_err(),
        RemoteError::Unauthorized
    );
}
