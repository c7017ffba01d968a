//! End-to-end API tests against a real listener.
//!
//! Spins up the application router on a random localhost port and
//! drives it with an HTTP client, the way the editor UI would.

use std::net::SocketAddr;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use formsmith_server::{app, AppState};

/// A test server instance with control handles.
struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server on a random available port.
    async fn start() -> Self {
        let port = portpicker::pick_unused_port().expect("no available port");
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let state = AppState::new(format!("http://{addr}"));
        let router = app(state);

        let listener = TcpListener::bind(addr).await.expect("failed to bind");
        let actual_addr = listener.local_addr().expect("failed to get local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("server error");
        });

        // Give the server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Self {
            addr: actual_addr,
            client: reqwest::Client::new(),
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn get_json(&self, path: &str) -> Value {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed");
        assert!(response.status().is_success(), "GET {path} failed");
        response.json().await.expect("invalid JSON response")
    }

    async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request failed")
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}

#[tokio::test]
async fn test_health_endpoints_respond() {
    let server = TestServer::start().await;

    let live = reqwest::get(server.url("/health/live"))
        .await
        .expect("request failed");
    assert_eq!(live.status(), 200);

    let ready: Value = server.get_json("/health/ready").await;
    assert_eq!(ready["status"], "healthy");
    assert_eq!(ready["checks"]["builder_store"], true);

    server.stop().await;
}

#[tokio::test]
async fn test_create_field_flow() {
    let server = TestServer::start().await;

    let response = server
        .post_json("/api/sessions/default/fields", &json!({"type": "text"}))
        .await;
    assert_eq!(response.status(), 201);
    let field: Value = response.json().await.expect("invalid JSON");
    assert_eq!(field["type"], "text");
    assert_eq!(field["label"], "Text Field");
    assert_eq!(field["name"], "field_text_1");

    let state: Value = server.get_json("/api/sessions/default").await;
    let fields = state["currentForm"]["steps"][0]["fields"]
        .as_array()
        .expect("fields array");
    assert_eq!(fields.len(), 1);
    assert_eq!(state["selectedFieldId"], field["id"]);

    server.stop().await;
}

#[tokio::test]
async fn test_choice_field_serializes_options() {
    let server = TestServer::start().await;

    let response = server
        .post_json("/api/sessions/default/fields", &json!({"type": "select"}))
        .await;
    let field: Value = response.json().await.expect("invalid JSON");
    let options = field["options"].as_array().expect("options array");
    assert_eq!(options.len(), 2);
    assert_eq!(options[0]["value"], "option1");

    server.stop().await;
}

#[tokio::test]
async fn test_delete_last_step_is_refused() {
    let server = TestServer::start().await;

    let response = server
        .client
        .delete(server.url("/api/sessions/default/steps/0"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 409);

    let state: Value = server.get_json("/api/sessions/default").await;
    let steps = state["currentForm"]["steps"].as_array().expect("steps");
    assert_eq!(steps.len(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_add_and_delete_step_clamps_current() {
    let server = TestServer::start().await;

    let response = server
        .post_json("/api/sessions/default/steps", &json!({}))
        .await;
    assert_eq!(response.status(), 201);
    let added: Value = response.json().await.expect("invalid JSON");
    assert_eq!(added["index"], 1);
    assert_eq!(added["step"]["title"], "Step 2");

    let response = server
        .client
        .delete(server.url("/api/sessions/default/steps/1"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 204);

    let state: Value = server.get_json("/api/sessions/default").await;
    assert_eq!(state["currentStepIndex"], 0);

    server.stop().await;
}

#[tokio::test]
async fn test_reorder_rejects_invalid_indices() {
    let server = TestServer::start().await;

    for field_type in ["text", "email"] {
        server
            .post_json(
                "/api/sessions/default/fields",
                &json!({"type": field_type}),
            )
            .await;
    }

    let response = server
        .post_json(
            "/api/sessions/default/fields/reorder",
            &json!({"from": 0, "to": 5}),
        )
        .await;
    assert_eq!(response.status(), 400);

    let state: Value = server.get_json("/api/sessions/default").await;
    let fields = state["currentForm"]["steps"][0]["fields"]
        .as_array()
        .expect("fields array");
    assert_eq!(fields[0]["type"], "text");
    assert_eq!(fields[1]["type"], "email");

    server.stop().await;
}

#[tokio::test]
async fn test_reorder_moves_field() {
    let server = TestServer::start().await;

    for field_type in ["text", "email", "date"] {
        server
            .post_json(
                "/api/sessions/default/fields",
                &json!({"type": field_type}),
            )
            .await;
    }

    let response = server
        .post_json(
            "/api/sessions/default/fields/reorder",
            &json!({"from": 0, "to": 2}),
        )
        .await;
    assert_eq!(response.status(), 204);

    let state: Value = server.get_json("/api/sessions/default").await;
    let fields = state["currentForm"]["steps"][0]["fields"]
        .as_array()
        .expect("fields array");
    let types: Vec<_> = fields.iter().map(|f| f["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["email", "date", "text"]);

    server.stop().await;
}

#[tokio::test]
async fn test_import_failure_leaves_state_untouched() {
    let server = TestServer::start().await;

    server
        .post_json("/api/sessions/default/name", &json!({"name": "Keep Me"}))
        .await;

    let response = server
        .client
        .post(server.url("/api/sessions/default/import"))
        .body("this is not json")
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("invalid JSON");
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("Failed to import form"));

    // Structurally invalid but parsable JSON is also refused
    let response = server
        .client
        .post(server.url("/api/sessions/default/import"))
        .body(r#"{"name": "missing steps"}"#)
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);

    let state: Value = server.get_json("/api/sessions/default").await;
    assert_eq!(state["currentForm"]["name"], "Keep Me");

    server.stop().await;
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let server = TestServer::start().await;

    server
        .post_json("/api/sessions/default/name", &json!({"name": "Round Trip"}))
        .await;
    for field_type in ["text", "radio"] {
        server
            .post_json(
                "/api/sessions/default/fields",
                &json!({"type": field_type}),
            )
            .await;
    }

    let export: Value = server.get_json("/api/sessions/default/export").await;
    assert!(export["filename"]
        .as_str()
        .expect("filename")
        .starts_with("round-trip-"));

    // Import the exported document into another session
    let response = server
        .client
        .post(server.url("/api/sessions/copy/import"))
        .body(export["document"].to_string())
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);

    let copy: Value = server.get_json("/api/sessions/copy").await;
    assert_eq!(copy["currentForm"], export["document"]);

    server.stop().await;
}

#[tokio::test]
async fn test_validate_value_endpoint() {
    let server = TestServer::start().await;

    let response = server
        .post_json("/api/sessions/default/fields", &json!({"type": "email"}))
        .await;
    let field: Value = response.json().await.expect("invalid JSON");

    // Attach a pattern rule via update
    let mut updated = field.clone();
    updated["validation"] = json!({"required": true, "pattern": r"[\w.-]+@[\w.-]+\.\w+"});
    let response = server
        .client
        .put(server.url("/api/sessions/default/fields"))
        .json(&updated)
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 204);

    let response = server
        .post_json(
            "/api/sessions/default/validate",
            &json!({"fieldId": field["id"], "value": "not-an-email"}),
        )
        .await;
    let verdict: Value = response.json().await.expect("invalid JSON");
    assert_eq!(verdict["valid"], false);
    assert_eq!(verdict["error"], "Invalid format");

    let response = server
        .post_json(
            "/api/sessions/default/validate",
            &json!({"fieldId": field["id"], "value": "jane@example.com"}),
        )
        .await;
    let verdict: Value = response.json().await.expect("invalid JSON");
    assert_eq!(verdict["valid"], true);

    server.stop().await;
}

#[tokio::test]
async fn test_validate_step_endpoint() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/api/sessions/default/template",
            &json!({"templateId": "template-contact"}),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = server
        .post_json(
            "/api/sessions/default/steps/0/validate",
            &json!({"values": {"full_name": "Jane Doe"}}),
        )
        .await;
    let verdict: Value = response.json().await.expect("invalid JSON");
    assert_eq!(verdict["valid"], false);
    assert_eq!(verdict["errors"]["email"], "This field is required");
    assert!(verdict["errors"].get("full_name").is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_templates_are_listed_and_loadable() {
    let server = TestServer::start().await;

    let templates: Value = server.get_json("/api/templates").await;
    let entries = templates.as_array().expect("template list");
    assert!(entries.iter().any(|t| t["id"] == "template-contact"));

    let state = server
        .post_json(
            "/api/sessions/default/template",
            &json!({"templateId": "template-contact"}),
        )
        .await;
    let state: Value = state.json().await.expect("invalid JSON");
    assert_eq!(state["currentForm"]["name"], "Contact Form");
    assert_eq!(state["currentStepIndex"], 0);

    let response = server
        .post_json(
            "/api/sessions/default/template",
            &json!({"templateId": "template-unknown"}),
        )
        .await;
    assert_eq!(response.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_share_link_embeds_form_id() {
    let server = TestServer::start().await;

    let state: Value = server.get_json("/api/sessions/default").await;
    let form_id = state["currentForm"]["id"].as_str().expect("form id");

    let share: Value = server.get_json("/api/sessions/default/share").await;
    let url = share["url"].as_str().expect("share url");
    assert!(url.ends_with(&format!("/f/{form_id}")));

    server.stop().await;
}

#[tokio::test]
async fn test_save_stamps_last_saved() {
    let server = TestServer::start().await;

    let response = server
        .post_json("/api/sessions/default/save", &json!({}))
        .await;
    let saved: Value = response.json().await.expect("invalid JSON");
    let stamp = saved["lastSaved"].as_u64().expect("timestamp");
    assert!(stamp > 0);

    let state: Value = server.get_json("/api/sessions/default").await;
    assert_eq!(state["lastSaved"].as_u64(), Some(stamp));

    server.stop().await;
}

#[tokio::test]
async fn test_invalid_session_id_is_rejected() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/api/sessions/has%20space"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);

    server.stop().await;
}

#[tokio::test]
async fn test_delete_selected_field_clears_selection() {
    let server = TestServer::start().await;

    let response = server
        .post_json("/api/sessions/default/fields", &json!({"type": "text"}))
        .await;
    let field: Value = response.json().await.expect("invalid JSON");
    let field_id = field["id"].as_str().expect("field id");

    let response = server
        .client
        .delete(server.url(&format!("/api/sessions/default/fields/{field_id}")))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 204);

    let state: Value = server.get_json("/api/sessions/default").await;
    assert_eq!(state["selectedFieldId"], Value::Null);

    server.stop().await;
}
