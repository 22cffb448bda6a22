use std::sync::Arc;

use super::*;
use crate::testing::{MockReply, MockTransport};
use crate::TransportError;

const BASE: &str = "http://fleetlock.example:3333";

fn client_with(reply: MockReply) -> FleetLockClient<MockTransport> {
    FleetLockClient::new(BASE, "workers", "node-7", MockTransport::always(reply)).unwrap()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn test_new_stores_identity_verbatim() {
    let client = FleetLockClient::new(
        BASE,
        " Workers ",
        "NODE 7\t",
        MockTransport::always(MockReply::status(200)),
    )
    .unwrap();

    assert_eq!(client.identity().group().as_str(), " Workers ");
    assert_eq!(client.identity().id().as_str(), "NODE 7\t");
}

#[test]
fn test_new_accepts_empty_identity() {
    let client =
        FleetLockClient::new(BASE, "", "", MockTransport::always(MockReply::status(200))).unwrap();
    assert_eq!(client.identity().group().as_str(), "");
    assert_eq!(client.identity().id().as_str(), "");
}

#[tokio::test]
async fn test_new_rejects_invalid_url_without_sending() {
    let transport = Arc::new(MockTransport::always(MockReply::status(200)));

    for raw in ["", "fleetlock.example", "localhost:8080", "/v1"] {
        let err = FleetLockClient::new(raw, "workers", "node-7", Arc::clone(&transport))
            .unwrap_err();
        assert!(
            matches!(err, FleetLockError::InvalidConfiguration { .. }),
            "expected InvalidConfiguration for {raw:?}, got {err:?}"
        );
    }

    assert!(transport.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_requests_target_operation_paths() {
    let client = client_with(MockReply::status(200));

    client.recursive_lock().await.unwrap();
    client.unlock_if_held().await.unwrap();

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.as_str(), format!("{BASE}/v1/pre-reboot"));
    assert_eq!(requests[1].url.as_str(), format!("{BASE}/v1/steady-state"));
    assert!(requests.iter().all(|r| r.method == "POST"));
}

#[tokio::test]
async fn test_request_body_round_trips_identity() {
    let client = client_with(MockReply::status(200));
    client.recursive_lock().await.unwrap();
    client.unlock_if_held().await.unwrap();

    for request in client.transport().requests() {
        let payload: Payload = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(payload.client_params.id.as_str(), "node-7");
        assert_eq!(payload.client_params.group.as_str(), "workers");

        let raw: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"client_params": {"id": "node-7", "group": "workers"}})
        );
    }
}

#[test]
fn test_request_carries_only_marker_header() {
    let client = client_with(MockReply::status(200));

    for operation in [Operation::PreReboot, Operation::SteadyState] {
        let request = client.build_request(operation).unwrap();
        let expected: BTreeMap<String, String> =
            [("fleet-lock-protocol".to_string(), "true".to_string())].into();
        assert_eq!(request.headers, expected);
    }
}

#[test]
fn test_request_url_with_prefix_and_trailing_slash() {
    let client = FleetLockClient::new(
        "https://lock.example/fleet/",
        "workers",
        "node-7",
        MockTransport::always(MockReply::status(200)),
    )
    .unwrap();

    let request = client.build_request(Operation::PreReboot).unwrap();
    assert_eq!(
        request.url.as_str(),
        "https://lock.example/fleet/v1/pre-reboot"
    );
}

// ---------------------------------------------------------------------------
// Response classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_2xx_is_success_regardless_of_body() {
    for reply in [
        MockReply::status(200),
        MockReply::respond(200, "not json at all"),
        MockReply::respond(204, r#"{"kind":"ignored","value":"ignored"}"#),
    ] {
        let client = client_with(reply);
        client.recursive_lock().await.unwrap();
        assert_eq!(client.transport().body_reads(), 1, "body must be drained");
    }
}

#[tokio::test]
async fn test_2xx_with_broken_body_is_still_success() {
    let client = client_with(MockReply::BrokenBody { status: 200 });
    client.unlock_if_held().await.unwrap();
}

#[tokio::test]
async fn test_409_with_error_body_is_protocol_error() {
    let client = client_with(MockReply::respond(
        409,
        r#"{"kind":"already_locked","value":"group workers has no free slot"}"#,
    ));

    let err = client.recursive_lock().await.unwrap_err();
    match &err {
        FleetLockError::Protocol {
            status,
            message,
            body,
        } => {
            assert_eq!(*status, 409);
            assert_eq!(message, "already_locked: group workers has no free slot");
            assert_eq!(body.kind, "already_locked");
        }
        other => panic!("expected Protocol, got {other:?}"),
    }
    assert!(err.to_string().contains("group workers has no free slot"));
}

#[tokio::test]
async fn test_3xx_and_4xx_and_5xx_are_treated_alike() {
    for status in [302, 400, 404, 503] {
        let client = client_with(MockReply::respond(
            status,
            r#"{"kind":"failed_unlock","value":"nope"}"#,
        ));
        let err = client.unlock_if_held().await.unwrap_err();
        assert!(
            matches!(err, FleetLockError::Protocol { status: s, .. } if s == status),
            "status {status}: got {err:?}"
        );
    }
}

#[tokio::test]
async fn test_500_with_unparsable_body_is_decode_error() {
    let client = client_with(MockReply::respond(500, "Internal Server Error"));

    let err = client.recursive_lock().await.unwrap_err();
    assert!(
        matches!(
            err,
            FleetLockError::ResponseDecode {
                status: 500,
                source: DecodeFailure::Json(_)
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_error_body_read_failure_is_decode_error() {
    let client = client_with(MockReply::BrokenBody { status: 503 });

    let err = client.recursive_lock().await.unwrap_err();
    assert!(
        matches!(
            err,
            FleetLockError::ResponseDecode {
                status: 503,
                source: DecodeFailure::Read(TransportError::Body(_))
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_status_outside_known_classes_is_unexpected() {
    for status in [101, 0, 600, 999] {
        let client = client_with(MockReply::respond(status, r#"{"kind":"x","value":"y"}"#));
        let err = client.recursive_lock().await.unwrap_err();
        assert!(
            matches!(err, FleetLockError::UnexpectedStatus { status: s } if s == status),
            "status {status}: got {err:?}"
        );
        assert_eq!(err.status(), Some(status));
    }
}

#[tokio::test]
async fn test_transport_failure_skips_decoding() {
    let client = client_with(MockReply::connection_refused());

    let err = client.recursive_lock().await.unwrap_err();
    assert!(
        matches!(
            err,
            FleetLockError::Transport {
                source: TransportError::ConnectionFailed(_)
            }
        ),
        "got {err:?}"
    );
    assert_eq!(client.transport().body_reads(), 0);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_unlock_is_repeatable() {
    let client = client_with(MockReply::status(200));

    client.unlock_if_held().await.unwrap();
    client.unlock_if_held().await.unwrap();

    assert_eq!(client.transport().requests().len(), 2);
}

#[tokio::test]
async fn test_queued_replies_are_used_in_order() {
    let client = client_with(MockReply::status(200));
    client.transport().push(MockReply::respond(
        409,
        r#"{"kind":"already_locked","value":"busy"}"#,
    ));

    assert!(client.recursive_lock().await.is_err());
    assert!(client.recursive_lock().await.is_ok());
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let client = Arc::new(client_with(MockReply::status(200)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    client.recursive_lock().await
                } else {
                    client.unlock_if_held().await
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(client.transport().requests().len(), 8);
}
