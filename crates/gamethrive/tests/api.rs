//! Integration tests for tags, purchases, and notification relay.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::Device;
use gamethrive::protocol::{TagValue, Tags};
use gamethrive::GameThriveError;
use gamethrive_backend::{BackendResponse, Endpoint, Method};

type Seen = Arc<Mutex<Vec<(Option<HashMap<String, String>>, bool)>>>;

fn recorder() -> (Seen, impl Fn(Option<HashMap<String, String>>, bool) + Send + Sync + 'static) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |data, active| sink.lock().unwrap().push((data, active)))
}

// ---------------------------------------------------------------------------
// Tags and purchases
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_calls_before_registration_make_no_requests() {
    let device = Device::silent();
    let sdk = device.launch().await;

    sdk.send_tag("level", 3).await;
    sdk.delete_tag("level").await;
    sdk.send_purchase(1.99).await;
    sdk.get_tags().await.unwrap();

    assert_eq!(device.backend.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_send_tags_puts_text_and_integer_values() {
    let device = Device::new();
    let sdk = device.launch().await;
    device.settle(1).await;

    let mut tags = Tags::new();
    tags.insert("level".into(), TagValue::from(7));
    tags.insert("class".into(), TagValue::from("mage"));
    sdk.send_tags(tags).await;

    let requests = device.backend.requests_to("/api/v1/players/player-1");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Put);
    assert_eq!(
        requests[0].body,
        Some(serde_json::json!({"tags": {"class": "mage", "level": 7}}))
    );
}

#[tokio::test(start_paused = true)]
async fn test_delete_tags_sends_empty_strings() {
    let device = Device::new();
    let sdk = device.launch().await;
    device.settle(1).await;

    sdk.delete_tags(["a", "b"]).await;

    let requests = device.backend.requests_to("/api/v1/players/player-1");
    assert_eq!(
        requests[0].body,
        Some(serde_json::json!({"tags": {"a": "", "b": ""}}))
    );
}

#[tokio::test(start_paused = true)]
async fn test_send_purchase_reports_amount_each_time() {
    let device = Device::new();
    let sdk = device.launch().await;
    device.settle(1).await;

    sdk.send_purchase(4.99).await;
    sdk.send_purchase(4.99).await;

    let purchases = device
        .backend
        .requests_to("/api/v1/players/player-1/on_purchase");
    assert_eq!(purchases.len(), 2);
    assert_eq!(purchases[0].method, Method::Put);
    assert_eq!(purchases[0].body, Some(serde_json::json!({"amount": 4.99})));
}

#[tokio::test(start_paused = true)]
async fn test_tag_failure_is_logged_not_returned() {
    let device = Device::new();
    let sdk = device.launch().await;
    device.settle(1).await;
    device.backend.fail_next();

    sdk.send_tag("level", 1).await;

    assert_eq!(device.backend.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_get_tags_without_delegate_is_misuse() {
    let device = Device::new();
    let sdk = device.launch().await;
    device.settle(1).await;

    let result = sdk.get_tags().await;

    assert!(matches!(result, Err(GameThriveError::MissingDelegate(_))));
    assert_eq!(device.backend.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_get_tags_with_before_registration_keeps_no_delegate() {
    let device = Device::silent();
    let sdk = device.launch().await;

    sdk.get_tags_with(|_| {}).await;

    device.channel().emit_address("https://push.example/channel/9");
    device.settle(1).await;
    let result = sdk.get_tags().await;
    assert!(matches!(result, Err(GameThriveError::MissingDelegate(_))));
    assert_eq!(device.backend.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_get_tags_with_delivers_backend_tags() {
    let device = Device::new();
    let sdk = device.launch().await;
    device.settle(1).await;
    device.backend.respond_with(|req| {
        assert_eq!(req.method, Method::Get);
        assert!(matches!(req.endpoint, Endpoint::Player(_)));
        Ok(BackendResponse::ok_json(
            serde_json::json!({"id": "player-1", "tags": {"class": "mage", "level": 7}}),
        ))
    });
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();

    sdk.get_tags_with(move |tags| *sink.lock().unwrap() = Some(tags))
        .await;

    let expected: HashMap<String, String> = [("class", "mage"), ("level", "7")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(*seen.lock().unwrap(), Some(expected));
}

// ---------------------------------------------------------------------------
// Notification relay
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_payload_while_active_reports_and_notifies() {
    let device = Device::new();
    let (seen, handler) = recorder();
    let _sdk = device
        .launch_with(device.builder().notification_handler(handler))
        .await;
    device.settle(1).await;

    device
        .channel()
        .emit_payload(r#"{"custom":{"i":"N1","a":{"k":"v"}}}"#);
    device.settle(2).await;

    let reports = device.backend.requests_to("/api/v1/notifications/N1");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].method, Method::Put);
    assert_eq!(
        reports[0].body,
        Some(serde_json::json!({"app_id": device.app_id, "player_id": "player-1", "opened": true}))
    );

    let expected = HashMap::from([("k".to_string(), "v".to_string())]);
    assert_eq!(*seen.lock().unwrap(), vec![(Some(expected), true)]);
    // Deep links are only followed on cold start.
    assert!(device.host.opened_urls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cold_start_opens_deep_link_before_callback() {
    let device = Device::silent();
    let host = device.host.clone();
    let order = Arc::new(Mutex::new(Vec::new()));
    let sink = order.clone();

    let _sdk = device
        .launch_with(
            device.builder()
                .notification_handler(move |data, active| {
                    let urls_opened = host.opened_urls().len();
                    sink.lock().unwrap().push((urls_opened, data, active));
                })
                .launch_param(
                    r#"?GameThriveParams={"custom":{"i":"N2","u":"https://game.example/sale"}}"#,
                ),
        )
        .await;
    device.settle(1).await;

    assert_eq!(
        device.host.opened_urls(),
        vec!["https://game.example/sale".to_string()]
    );
    // The link was already open when the callback ran.
    assert_eq!(*order.lock().unwrap(), vec![(1, None, false)]);

    // Fresh install: reported with a null player id.
    let reports = device.backend.requests_to("/api/v1/notifications/N2");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].body.as_ref().unwrap()["player_id"], serde_json::Value::Null);
}

#[tokio::test(start_paused = true)]
async fn test_opened_report_keeps_notification_id_in_one_segment() {
    let device = Device::new();
    let sdk = device.launch().await;
    device.settle(1).await;

    assert!(
        sdk.handle_notification(r#"{"custom":{"i":"x/../../players/p1"}}"#)
            .await
    );
    device.settle(2).await;

    let reports = device
        .backend
        .requests_to("/api/v1/notifications/x%2F..%2F..%2Fplayers%2Fp1");
    assert_eq!(reports.len(), 1);
    assert!(device.backend.requests_to("/api/v1/players/p1").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unparseable_payload_is_dropped() {
    let device = Device::new();
    let (seen, handler) = recorder();
    let sdk = device
        .launch_with(device.builder().notification_handler(handler))
        .await;
    device.settle(1).await;

    device.channel().emit_payload("not json at all");
    device.channel().emit_payload(r#"{"custom":{"u":"https://x"}}"#);
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert!(!sdk.handle_notification("{}").await);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(device.backend.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_handler_set_after_start_replaces_initial_one() {
    let device = Device::new();
    let (first, first_handler) = recorder();
    let sdk = device
        .launch_with(device.builder().notification_handler(first_handler))
        .await;
    device.settle(1).await;
    let (second, second_handler) = recorder();
    sdk.set_notification_handler(second_handler);

    assert!(sdk.handle_notification(r#"{"custom":{"i":"N3"}}"#).await);

    assert!(first.lock().unwrap().is_empty());
    assert_eq!(*second.lock().unwrap(), vec![(None, true)]);
}
