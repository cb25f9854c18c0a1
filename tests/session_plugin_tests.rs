//! End-to-end tests for plugin-mode chat turns: one mock backend serves the
//! SSE stream and the device endpoints, and the session drives extraction,
//! deduplication, execution, and transcript reconciliation across them.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use turbopi::config::ClientConfig;
use turbopi::error::TurboPiError;
use turbopi::prelude::*;
use turbopi::transcript::Role;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sse_body(records: &[serde_json::Value]) -> String {
    records
        .iter()
        .map(|r| format!("data: {r}\n"))
        .collect::<String>()
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({
        "code": "OK",
        "message": "success",
        "trace_id": "t-test",
        "mode": "mock",
        "data": data,
    })
}

async fn mount_stream(server: &MockServer, records: &[serde_json::Value]) {
    Mock::given(method("POST"))
        .and(path("/api/v1/coze/conversations/stream/plugins"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(records), "text/event-stream"),
        )
        .mount(server)
        .await;
}

async fn session_for(server: &MockServer) -> ChatSession {
    ChatSession::with_backend(ApiClient::new(ClientConfig::new(server.uri())), "bot-1")
}

fn conv_id(event_content: &str) -> serde_json::Value {
    json!({"type": "conversation_id", "content": event_content})
}

// ---------------------------------------------------------------------------
// Scenario A: one robot_ctrl call streams in, executes exactly once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn streamed_robot_ctrl_call_executes_once() {
    let server = MockServer::start().await;
    let call = r#"{"plugin_name":"robot_ctrl","arguments":{"cmd":"forward","speed":0.8,"duration_ms":500}}"#;
    mount_stream(
        &server,
        &[
            conv_id("conv_1"),
            json!({"type": "content", "content": "好的，"}),
            json!({"type": "content", "content": call}),
            json!({"type": "completed", "content": format!("好的，{call}")}),
            json!({"type": "done"}),
        ],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/control/move"))
        .and(body_partial_json(json!({
            "command": "forward",
            "speed": 0.8,
            "duration_ms": 500
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({"message": "moving"}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server).await;
    let outcome = session.send("向前走", None).await.unwrap();

    assert_eq!(outcome.conversation_id.as_deref(), Some("conv_1"));
    let conv = &session.conversations()[0];
    assert_eq!(conv.id, "conv_1");
    let report = conv.messages.last().unwrap();
    assert_eq!(report.role, Role::Assistant);
    assert!(report.content.contains("插件执行完成（机器人控制）"));
    assert!(report.content.contains("速度=0.8"));
    assert!(report.content.contains("时长=500ms"));
    // Exactly one execution report, not one per occurrence.
    let reports = conv
        .messages
        .iter()
        .filter(|m| m.content.contains("插件执行完成"))
        .count();
    assert_eq!(reports, 1);
}

// ---------------------------------------------------------------------------
// Scenario B: duplicated stop call in content and completed text
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicated_stop_call_runs_once() {
    let server = MockServer::start().await;
    let call = r#"{"plugin_name":"robot_ctrl","arguments":{"cmd":"stop"}}"#;
    // Same call twice mid-stream (once with reordered whitespace) and again
    // verbatim in the completed text.
    let reordered = r#"{ "arguments": {"cmd": "stop"}, "plugin_name": "robot_ctrl" }"#;
    mount_stream(
        &server,
        &[
            conv_id("conv_1"),
            json!({"type": "content", "content": call}),
            json!({"type": "content", "content": reordered}),
            json!({"type": "completed", "content": call}),
            json!({"type": "done"}),
        ],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/control/stop"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({"message": "stopped"}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server).await;
    session.send("停下", None).await.unwrap();

    let conv = &session.conversations()[0];
    let reports = conv
        .messages
        .iter()
        .filter(|m| m.content.contains("已停止"))
        .count();
    assert_eq!(reports, 1);
}

// ---------------------------------------------------------------------------
// Scenario C: plain prose, no execution, no duplicated bubble
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plain_prose_turn_executes_nothing() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        &[
            conv_id("conv_1"),
            json!({"type": "content", "content": "我将"}),
            json!({"type": "content", "content": "为你拍照"}),
            json!({"type": "completed", "content": "我将为你拍照"}),
            json!({"type": "done"}),
        ],
    )
    .await;
    // No device endpoints mounted: any execution attempt would 404 and show
    // up as a failure report in the transcript.

    let mut session = session_for(&server).await;
    let outcome = session.send("拍照", None).await.unwrap();

    assert_eq!(outcome.final_text.as_deref(), Some("我将为你拍照"));
    let conv = &session.conversations()[0];
    // User message plus exactly one assistant bubble; completion replaced
    // the streamed text instead of appending a second copy.
    assert_eq!(conv.messages.len(), 2);
    assert_eq!(conv.messages[1], Message::assistant("我将为你拍照"));
}

// ---------------------------------------------------------------------------
// Scenario D: tool call arrives before the conversation id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn call_before_conversation_id_executes_under_that_id() {
    let server = MockServer::start().await;
    let call = r#"{"plugin_name":"robot_ctrl","arguments":{"cmd":"turn_left"}}"#;
    mount_stream(
        &server,
        &[
            json!({"type": "content", "content": call}),
            conv_id("conv_42"),
            json!({"type": "completed", "content": "已安排左转"}),
            json!({"type": "done"}),
        ],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/control/move"))
        .and(body_partial_json(json!({"command": "left"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({"message": "moving"}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server).await;
    let outcome = session.send("左转", None).await.unwrap();

    assert_eq!(outcome.conversation_id.as_deref(), Some("conv_42"));
    let conv = &session.conversations()[0];
    assert_eq!(conv.id, "conv_42");
    assert!(conv
        .messages
        .iter()
        .any(|m| m.content.contains("插件执行完成（机器人控制）")));
}

// ---------------------------------------------------------------------------
// Photo plugin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn photo_call_embeds_snapshot_in_transcript() {
    let server = MockServer::start().await;
    let call = r#"{"plugin_name":"take_photo_for_recognition","arguments":{}}"#;
    mount_stream(
        &server,
        &[
            conv_id("conv_1"),
            json!({"type": "content", "content": call}),
            json!({"type": "completed", "content": call}),
            json!({"type": "done"}),
        ],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/camera/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "snapshot": {
                "saved_path": "/home/pi/shots/0001.jpg",
                "base64": "aGVsbG8=",
                "width": 640,
                "height": 480,
                "jpeg_quality": 85,
                "timestamp": "2025-06-01T10:00:00"
            },
            "runtime_mode": "real"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server).await;
    session.send("拍一张照片", None).await.unwrap();

    let conv = &session.conversations()[0];
    let report = conv.messages.last().unwrap();
    assert!(report.content.contains("尺寸=640x480"));
    assert!(report
        .content
        .contains("data:image/jpeg;base64,aGVsbG8="));
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn device_failure_lands_in_transcript_and_turn_still_completes() {
    let server = MockServer::start().await;
    let call = r#"{"plugin_name":"robot_ctrl","arguments":{"cmd":"forward"}}"#;
    mount_stream(
        &server,
        &[
            conv_id("conv_1"),
            json!({"type": "content", "content": call}),
            json!({"type": "completed", "content": call}),
            json!({"type": "done"}),
        ],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/control/move"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "detail": {"code": "CAR_BUSY", "message": "robot is busy", "trace_id": "t-1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server).await;
    let outcome = session.send("向前走", None).await.unwrap();

    assert!(outcome.final_text.is_some());
    let conv = &session.conversations()[0];
    let report = conv.messages.last().unwrap();
    assert!(report.content.contains("插件执行失败（robot_ctrl）"));
    assert!(report.content.contains("robot is busy"));
}

#[tokio::test]
async fn protocol_error_event_surfaces_as_stream_error() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        &[
            conv_id("conv_1"),
            json!({"type": "error", "content": "上游超时", "error_code": "COZE_TIMEOUT"}),
        ],
    )
    .await;

    let mut session = session_for(&server).await;
    let err = session.send("你好", None).await.expect_err("must fail");
    match err {
        TurboPiError::Stream {
            message,
            error_code,
        } => {
            assert_eq!(message, "上游超时");
            assert_eq!(error_code.as_deref(), Some("COZE_TIMEOUT"));
        }
        other => panic!("expected stream error, got {other:?}"),
    }
}

#[tokio::test]
async fn disallowed_plugin_name_is_never_executed() {
    let server = MockServer::start().await;
    let call = r#"{"plugin_name":"delete_all_data","arguments":{"target":"/"}}"#;
    mount_stream(
        &server,
        &[
            conv_id("conv_1"),
            json!({"type": "content", "content": call}),
            json!({"type": "completed", "content": call}),
            json!({"type": "done"}),
        ],
    )
    .await;

    let mut session = session_for(&server).await;
    session.send("清空数据", None).await.unwrap();

    let conv = &session.conversations()[0];
    // Treated as prose: the JSON text stays in the assistant bubble and no
    // execution report follows it.
    assert_eq!(conv.messages.len(), 2);
    assert!(!conv
        .messages
        .iter()
        .any(|m| m.content.contains("插件执行")));
}

// ---------------------------------------------------------------------------
// Conversation lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_delete_conversation_track_backend_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/coze/conversations/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({"id": "conv_new"}))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/coze/conversations/conv_new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": "conv_new",
            "deleted": true
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server).await;
    let id = session.create_conversation(Some("你好")).await.unwrap();
    assert_eq!(id, "conv_new");
    assert_eq!(session.conversations().len(), 1);
    assert_eq!(session.conversations()[0].messages.len(), 1);

    session.delete_conversation(&id).await.unwrap();
    assert!(session.conversations().is_empty());
}

#[tokio::test]
async fn second_turn_reuses_the_existing_conversation() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        &[
            conv_id("conv_1"),
            json!({"type": "content", "content": "第二次回复"}),
            json!({"type": "completed", "content": "第二次回复"}),
            json!({"type": "done"}),
        ],
    )
    .await;

    let mut session = session_for(&server).await;
    // First turn creates conv_1 implicitly.
    session.send("第一问", None).await.unwrap();
    assert_eq!(session.conversations().len(), 1);

    // Second turn targets it explicitly; no duplicate conversation appears.
    session.send("第二问", Some("conv_1")).await.unwrap();
    assert_eq!(session.conversations().len(), 1);

    let conv = &session.conversations()[0];
    // turn 1: user + assistant, turn 2: user + assistant.
    assert_eq!(conv.messages.len(), 4);
    assert_eq!(conv.messages[2], Message::user("第二问"));
    assert_eq!(conv.messages[3], Message::assistant("第二次回复"));
}
