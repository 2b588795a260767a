// ABOUTME: Best-effort chat notifications over an incoming webhook.
// ABOUTME: Posts a Slack-style JSON payload; an empty webhook URL disables sending.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::NotifyConfig;

/// Username the webhook message is posted as.
pub const PLUGIN_USERNAME: &str = "drone-rancher-plugin";

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// A message for a chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub channel: String,
    pub emoji: String,
}

impl Notification {
    /// A message for the success channel.
    pub fn success(config: &NotifyConfig, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            channel: config.success_channel.clone(),
            emoji: config.success_emoji.clone(),
        }
    }

    /// A message for the blocked-pipeline channel.
    pub fn blocked(config: &NotifyConfig, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            channel: config.blocked_channel.clone(),
            emoji: config.blocked_emoji.clone(),
        }
    }

    fn payload(&self) -> Payload<'_> {
        Payload {
            text: &self.message,
            channel: format!("#{}", self.channel),
            username: PLUGIN_USERNAME,
            icon_emoji: format!(":{}:", self.emoji),
        }
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    text: &'a str,
    channel: String,
    username: &'a str,
    icon_emoji: String,
}

/// Errors delivering a notification. Callers treat these as warnings.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook returned {0}")]
    Status(reqwest::StatusCode),
}

/// Sink for deployment notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Not retried.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Posts notifications to an incoming-webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    webhook: Option<String>,
}

impl WebhookNotifier {
    pub fn new(webhook: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            webhook: webhook.filter(|w| !w.trim().is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook.is_some()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let Some(webhook) = &self.webhook else {
            tracing::debug!("no webhook configured, skipping notification");
            return Ok(());
        };

        let resp = self
            .http
            .post(webhook)
            .json(&notification.payload())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NotifyError::Status(resp.status()));
        }

        tracing::debug!(channel = %notification.channel, "notification delivered");
        Ok(())
    }
}
