//! Client session tests against a real hub (mcp-devkit harness)

use std::time::Duration;

use mcp_agent::demo::run_demo;
use mcp_agent::{ClientSession, SessionError};
use mcp_devkit::{dead_endpoint, SilentEndpoint, TestHarness};
use mcp_kernel::ClientStatus;
use serde_json::json;

#[tokio::test]
async fn test_register_marks_session_registered() {
    let harness = TestHarness::start().await.unwrap();
    let mut session = ClientSession::new(
        harness.base_url(),
        Some("client-1".into()),
        Some(vec!["messaging".into()]),
    );

    let ack = session.register().await.unwrap();

    assert!(session.is_registered());
    assert_eq!(ack.status, "success");
    assert_eq!(ack.client_id, "client-1");
    let record = harness.hub().get_client("client-1").unwrap();
    assert_eq!(record.status, ClientStatus::Active);
    assert!(record.capabilities.contains("messaging"));
}

#[tokio::test]
async fn test_send_auto_registers_first() {
    let harness = TestHarness::start().await.unwrap();
    let mut session = ClientSession::new(harness.base_url(), Some("client-1".into()), None);

    let ack = session.send_heartbeat().await.unwrap();

    assert!(session.is_registered());
    assert_eq!(ack, json!({"status": "success", "message": "Heartbeat acknowledged"}));
    assert_eq!(harness.hub().client_count(), 1);
    harness.assert_message_count(1).unwrap();
    assert_eq!(harness.message_field(0, "content.status"), Some(json!("active")));
    assert!(harness.message_field(0, "content.timestamp").unwrap().is_string());
}

#[tokio::test]
async fn test_data_and_command_envelopes() {
    let harness = TestHarness::start().await.unwrap();
    let mut session = ClientSession::new(harness.base_url(), Some("client-1".into()), None);

    let ack = session
        .send_data(json!({"temperature": 22}), Some("client-2"))
        .await
        .unwrap();
    assert_eq!(ack["message"], "Data received and processed");

    let ack = session
        .send_command("check_status", Some(json!({"verbose": true})), None)
        .await
        .unwrap();
    assert_eq!(ack["result"]["status"], "executed");

    let messages = harness.messages();
    assert_eq!(messages[0].recipient, "client-2");
    assert_eq!(messages[0].content, json!({"temperature": 22}));
    assert_eq!(messages[1].recipient, "broadcast");
    assert_eq!(
        messages[1].content,
        json!({"command": "check_status", "params": {"verbose": true}})
    );
    assert_eq!(ack["result"]["command_id"], messages[1].id.as_str());
}

#[tokio::test]
async fn test_empty_payload_sent_without_content() {
    let harness = TestHarness::start().await.unwrap();
    let mut session = ClientSession::new(harness.base_url(), Some("client-1".into()), None);

    session.send_data(json!({}), None).await.unwrap();

    // the hub fills the default
    assert_eq!(harness.messages()[0].content, json!({}));
}

#[tokio::test]
async fn test_unreachable_hub_is_transport_error() {
    let url = dead_endpoint().await.unwrap();
    let mut session = ClientSession::new(url, Some("client-1".into()), None);

    let err = session.register().await.unwrap_err();

    assert!(matches!(err, SessionError::Transport { .. }));
    assert!(!err.is_timeout());
    assert!(!session.is_registered());
}

#[tokio::test]
async fn test_failed_registration_blocks_send() {
    let url = dead_endpoint().await.unwrap();
    let mut session = ClientSession::new(url, Some("client-1".into()), None);

    let err = session.send_heartbeat().await.unwrap_err();

    assert!(matches!(err, SessionError::Transport { ref endpoint, .. } if endpoint == "/api/register"));
    assert!(!session.is_registered());
}

#[tokio::test]
async fn test_silent_hub_times_out() {
    let silent = SilentEndpoint::start().await.unwrap();
    let mut session = ClientSession::new(silent.base_url(), Some("client-1".into()), None)
        .with_timeout(Duration::from_millis(200));

    let err = session.register().await.unwrap_err();

    assert!(err.is_timeout());
    assert!(!session.is_registered());
}

#[tokio::test]
async fn test_non_success_status_is_rejection() {
    let harness = TestHarness::start().await.unwrap();
    // no such route under this prefix: the hub answers 404
    let mut session = ClientSession::new(format!("{}/nope", harness.base_url()), None, None);

    let err = session.register().await.unwrap_err();

    assert!(matches!(err, SessionError::Rejected { status: 404, .. }));
    assert!(!session.is_registered());
    assert_eq!(harness.hub().client_count(), 0);
}

#[tokio::test]
async fn test_demo_without_loop_sends_bookend_data() {
    let harness = TestHarness::start().await.unwrap();
    let mut session = ClientSession::new(harness.base_url(), Some("demo-1".into()), None);

    let report = run_demo(&mut session, Duration::ZERO, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(report.iterations, 0);
    assert_eq!(report.failed_sends, 0);
    assert_eq!(harness.message_types(), vec!["data", "data"]);
    assert_eq!(harness.message_field(0, "content.client_info.name"), Some(json!("Demo Client")));
    assert_eq!(harness.message_field(1, "content.message"), Some(json!("Demo completed")));
}

#[tokio::test]
async fn test_demo_single_tick() {
    let harness = TestHarness::start().await.unwrap();
    let mut session = ClientSession::new(harness.base_url(), Some("demo-1".into()), None);

    let report = run_demo(
        &mut session,
        Duration::from_millis(100),
        Duration::from_millis(500),
    )
    .await
    .unwrap();

    assert_eq!(report.iterations, 1);
    assert_eq!(
        harness.message_types(),
        vec!["data", "heartbeat", "data", "command", "data"]
    );
    assert_eq!(
        harness.message_field(3, "content.params"),
        Some(json!({"verbose": true, "include_metrics": true}))
    );
    assert_eq!(harness.message_field(4, "content.metrics.messages_sent"), Some(json!(1)));
    harness.assert_client_active("demo-1").unwrap();
}

#[tokio::test]
async fn test_demo_schedule_over_several_ticks() {
    let harness = TestHarness::start().await.unwrap();
    let mut session = ClientSession::new(harness.base_url(), Some("demo-1".into()), None);

    let report = run_demo(
        &mut session,
        Duration::from_millis(1150),
        Duration::from_millis(200),
    )
    .await
    .unwrap();

    // heartbeat every tick, data every 3rd, command every 5th
    assert_eq!(report.iterations, 6);
    assert_eq!(report.failed_sends, 0);
    assert_eq!(
        harness.message_types(),
        vec![
            "data", // client_info
            "heartbeat", "data", "command", // tick 0
            "heartbeat",
            "heartbeat",
            "heartbeat", "data", // tick 3
            "heartbeat",
            "heartbeat", "command", // tick 5
            "data", // completion
        ]
    );
    assert_eq!(
        harness.message_field(11, "content.metrics.messages_sent"),
        Some(json!(6))
    );
}

#[tokio::test]
async fn test_demo_aborts_when_registration_fails() {
    let url = dead_endpoint().await.unwrap();
    let mut session = ClientSession::new(url, None, None);

    let err = run_demo(&mut session, Duration::from_secs(60), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Failed to register client"));
}
