// ABOUTME: Integration tests for webhook notification delivery.
// ABOUTME: Uses a mock HTTP server to check the posted payload and failure handling.

use drone_rancher::config::NotifyConfig;
use drone_rancher::notify::{Notification, Notifier, NotifyError, WebhookNotifier};
use mockito::{Matcher, Server};
use serde_json::json;

fn notify_config() -> NotifyConfig {
    NotifyConfig {
        webhook: None,
        success_channel: "deploys".to_string(),
        blocked_channel: "alerts".to_string(),
        success_emoji: "rocket".to_string(),
        blocked_emoji: "no_entry".to_string(),
    }
}

#[tokio::test]
async fn posts_slack_payload() {
    let mut server = Server::new_async().await;
    let hook = server
        .mock("POST", "/hooks/deploy")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "text": "CD pipeline blocked on deployment to prod/web",
            "channel": "#alerts",
            "username": "drone-rancher-plugin",
            "icon_emoji": ":no_entry:"
        })))
        .with_status(200)
        .create_async()
        .await;

    let notifier = WebhookNotifier::new(Some(format!("{}/hooks/deploy", server.url())));
    let n = Notification::blocked(
        &notify_config(),
        "CD pipeline blocked on deployment to prod/web",
    );

    notifier.notify(&n).await.unwrap();
    hook.assert_async().await;
}

#[tokio::test]
async fn rejected_delivery_is_reported_not_retried() {
    let mut server = Server::new_async().await;
    let hook = server
        .mock("POST", "/hooks/deploy")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let notifier = WebhookNotifier::new(Some(format!("{}/hooks/deploy", server.url())));
    let n = Notification::success(&notify_config(), "Deployment to prod/web completed");

    let err = notifier.notify(&n).await.unwrap_err();
    assert!(matches!(err, NotifyError::Status(s) if s.as_u16() == 500));
    hook.assert_async().await;
}

#[tokio::test]
async fn unreachable_webhook_is_a_request_error() {
    let notifier = WebhookNotifier::new(Some("http://127.0.0.1:1/hook".to_string()));
    let n = Notification::success(&notify_config(), "done");

    let err = notifier.notify(&n).await.unwrap_err();
    assert!(matches!(err, NotifyError::Request(_)));
}
