// ABOUTME: Plugin configuration loaded from PLUGIN_* environment variables.
// ABOUTME: Validates required settings and normalizes the target and image.

mod parse;

pub use parse::{parse_batch_size, parse_bool, parse_duration};

use crate::error::{Error, Result};
use crate::retry::{DEFAULT_INTERVAL, DEFAULT_JITTER, RetryPolicy};
use crate::types::{ImageUuid, ServiceTarget, TargetError};
use std::collections::HashMap;
use std::time::Duration;

/// Environment variable names, following the Drone plugin convention.
pub mod vars {
    pub const URL: &str = "PLUGIN_URL";
    pub const ACCESS_KEY: &str = "PLUGIN_ACCESS_KEY";
    pub const SECRET_KEY: &str = "PLUGIN_SECRET_KEY";
    pub const SERVICE: &str = "PLUGIN_SERVICE";
    pub const STACK: &str = "PLUGIN_STACK";
    pub const IMAGE: &str = "PLUGIN_DOCKER_IMAGE";
    pub const START_FIRST: &str = "PLUGIN_START_FIRST";
    pub const CONFIRM: &str = "PLUGIN_CONFIRM";
    pub const BATCH_SIZE: &str = "PLUGIN_BATCH_SIZE";
    pub const BATCH_INTERVAL: &str = "PLUGIN_BATCH_INTERVAL";
    pub const TIMEOUT: &str = "PLUGIN_TIMEOUT";
    pub const RETRY_INTERVAL: &str = "PLUGIN_RETRY_INTERVAL";
    pub const RETRY_JITTER: &str = "PLUGIN_RETRY_JITTER";
    pub const NOTIFY_WEBHOOK: &str = "PLUGIN_NOTIFY_WEBHOOK";
    pub const SUCCESS_CHANNEL: &str = "PLUGIN_SUCCESS_CHANNEL";
    pub const BLOCKED_CHANNEL: &str = "PLUGIN_BLOCKED_CHANNEL";
    pub const SUCCESS_EMOJI: &str = "PLUGIN_SUCCESS_EMOJI";
    pub const BLOCKED_EMOJI: &str = "PLUGIN_BLOCKED_EMOJI";

    /// Every variable the plugin reads.
    pub const ALL: &[&str] = &[
        URL,
        ACCESS_KEY,
        SECRET_KEY,
        SERVICE,
        STACK,
        IMAGE,
        START_FIRST,
        CONFIRM,
        BATCH_SIZE,
        BATCH_INTERVAL,
        TIMEOUT,
        RETRY_INTERVAL,
        RETRY_JITTER,
        NOTIFY_WEBHOOK,
        SUCCESS_CHANNEL,
        BLOCKED_CHANNEL,
        SUCCESS_EMOJI,
        BLOCKED_EMOJI,
    ];
}

/// Validated settings for one deployment run.
#[derive(Clone)]
pub struct Config {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub target: ServiceTarget,
    pub image: ImageUuid,
    pub start_first: bool,
    pub confirm: bool,
    pub batch_size: i64,
    pub batch_interval: Duration,
    /// Budget for each retried call.
    pub timeout: Duration,
    pub retry_interval: Duration,
    pub retry_jitter: Duration,
    pub notify: NotifyConfig,
}

/// Where and how notifications are posted. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyConfig {
    pub webhook: Option<String>,
    pub success_channel: String,
    pub blocked_channel: String,
    pub success_emoji: String,
    pub blocked_emoji: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("target", &self.target)
            .field("image", &self.image)
            .field("start_first", &self.start_first)
            .field("confirm", &self.confirm)
            .field("batch_size", &self.batch_size)
            .field("batch_interval", &self.batch_interval)
            .field("timeout", &self.timeout)
            .field("retry_interval", &self.retry_interval)
            .field("retry_jitter", &self.retry_jitter)
            .field("notify", &self.notify)
            .finish()
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an explicit map of variables.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Load using `lookup` to resolve each variable.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str, field: &'static str| get(key).ok_or(Error::MissingParameter(field));

        let endpoint = require(vars::URL, "endpoint")?;
        reqwest::Url::parse(&endpoint).map_err(|e| Error::InvalidParameter {
            field: "endpoint",
            reason: e.to_string(),
        })?;
        let access_key = require(vars::ACCESS_KEY, "accesskey")?;
        let secret_key = require(vars::SECRET_KEY, "secretkey")?;

        let service = require(vars::SERVICE, "service")?;
        let target = ServiceTarget::resolve(service.trim(), get(vars::STACK).as_deref())
            .map_err(|e| match e {
                TargetError::ConflictingStack => Error::ConflictingStack,
                TargetError::EmptyStack => Error::MissingParameter("stack"),
                TargetError::EmptyService => Error::InvalidParameter {
                    field: "service",
                    reason: e.to_string(),
                },
            })?;

        let image = ImageUuid::parse(&require(vars::IMAGE, "image")?).map_err(|e| {
            Error::InvalidParameter {
                field: "image",
                reason: e.to_string(),
            }
        })?;

        let start_first = required(&get, vars::START_FIRST, "startfirst", parse_bool)?;
        let confirm = required(&get, vars::CONFIRM, "confirm", parse_bool)?;
        let batch_size = required(&get, vars::BATCH_SIZE, "batch size", parse_batch_size)?;
        let batch_interval =
            required(&get, vars::BATCH_INTERVAL, "batch interval", parse_duration)?;
        let timeout = required(&get, vars::TIMEOUT, "timeout", parse_duration)?;

        let retry_interval = optional(&get, vars::RETRY_INTERVAL, "retry interval", parse_duration)?
            .unwrap_or(DEFAULT_INTERVAL);
        let retry_jitter = optional(&get, vars::RETRY_JITTER, "retry jitter", parse_duration)?
            .unwrap_or(DEFAULT_JITTER);

        let notify = NotifyConfig {
            webhook: get(vars::NOTIFY_WEBHOOK),
            success_channel: get(vars::SUCCESS_CHANNEL).unwrap_or_default(),
            blocked_channel: get(vars::BLOCKED_CHANNEL).unwrap_or_default(),
            success_emoji: get(vars::SUCCESS_EMOJI).unwrap_or_default(),
            blocked_emoji: get(vars::BLOCKED_EMOJI).unwrap_or_default(),
        };

        Ok(Config {
            endpoint,
            access_key,
            secret_key,
            target,
            image,
            start_first,
            confirm,
            batch_size,
            batch_interval,
            timeout,
            retry_interval,
            retry_jitter,
            notify,
        })
    }

    /// Retry timing shared by every network call of the run.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.timeout)
            .interval(self.retry_interval)
            .jitter(self.retry_jitter)
    }

    /// Batch interval as Rancher expects it.
    pub fn batch_interval_millis(&self) -> i64 {
        i64::try_from(self.batch_interval.as_millis()).unwrap_or(i64::MAX)
    }

    /// A config with placeholder values, for tests and examples.
    pub fn template() -> Self {
        Config {
            endpoint: "http://rancher.example.com/v1".to_string(),
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
            target: ServiceTarget::new("prod", "web"),
            image: ImageUuid::parse("myapp:latest").expect("template image is valid"),
            start_first: false,
            confirm: false,
            batch_size: 1,
            batch_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
            retry_interval: DEFAULT_INTERVAL,
            retry_jitter: DEFAULT_JITTER,
            notify: NotifyConfig::default(),
        }
    }
}

fn required<T, G, P>(get: &G, key: &str, field: &'static str, parse: P) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    P: Fn(&str) -> std::result::Result<T, String>,
{
    optional(get, key, field, parse)?.ok_or(Error::MissingParameter(field))
}

fn optional<T, G, P>(get: &G, key: &str, field: &'static str, parse: P) -> Result<Option<T>>
where
    G: Fn(&str) -> Option<String>,
    P: Fn(&str) -> std::result::Result<T, String>,
{
    get(key)
        .map(|raw| parse(&raw).map_err(|reason| Error::InvalidParameter { field, reason }))
        .transpose()
}
