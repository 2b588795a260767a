// ABOUTME: Integration tests for PLUGIN_* configuration loading and validation.
// ABOUTME: Tests required fields, target splitting, image prefixing and parse errors.

use drone_rancher::config::{Config, vars};
use drone_rancher::error::{Error, ErrorKind};
use std::collections::HashMap;
use std::time::Duration;

fn base_vars() -> HashMap<String, String> {
    [
        (vars::URL, "http://rancher.local:8080/v1"),
        (vars::ACCESS_KEY, "access"),
        (vars::SECRET_KEY, "secret"),
        (vars::SERVICE, "web"),
        (vars::STACK, "prod"),
        (vars::IMAGE, "myapp:v2"),
        (vars::START_FIRST, "true"),
        (vars::CONFIRM, "false"),
        (vars::BATCH_SIZE, "2"),
        (vars::BATCH_INTERVAL, "5s"),
        (vars::TIMEOUT, "2m"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn with(overrides: &[(&str, &str)]) -> HashMap<String, String> {
    let mut vars = base_vars();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    vars
}

fn without(key: &str) -> HashMap<String, String> {
    let mut vars = base_vars();
    vars.remove(key);
    vars
}

mod parsing {
    use super::*;

    #[test]
    fn parse_complete_settings() {
        let config = Config::from_map(&base_vars()).unwrap();

        assert_eq!(config.endpoint, "http://rancher.local:8080/v1");
        assert_eq!(config.target.stack(), "prod");
        assert_eq!(config.target.service(), "web");
        assert_eq!(config.image.as_str(), "docker:myapp:v2");
        assert!(config.start_first);
        assert!(!config.confirm);
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.batch_interval, Duration::from_secs(5));
        assert_eq!(config.batch_interval_millis(), 5000);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.notify.webhook, None);
    }

    #[test]
    fn retry_timing_defaults_and_overrides() {
        let config = Config::from_map(&base_vars()).unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.budget, Duration::from_secs(120));
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.jitter, Duration::from_millis(500));

        let config = Config::from_map(&with(&[
            (vars::RETRY_INTERVAL, "3s"),
            (vars::RETRY_JITTER, "0"),
        ]))
        .unwrap();
        assert_eq!(config.retry_interval, Duration::from_secs(3));
        assert_eq!(config.retry_jitter, Duration::ZERO);
    }

    #[test]
    fn notification_settings_are_optional() {
        let config = Config::from_map(&with(&[
            (vars::NOTIFY_WEBHOOK, "https://hooks.slack.com/services/T/B/X"),
            (vars::SUCCESS_CHANNEL, "deploys"),
            (vars::BLOCKED_CHANNEL, "alerts"),
            (vars::SUCCESS_EMOJI, "rocket"),
            (vars::BLOCKED_EMOJI, "no_entry"),
        ]))
        .unwrap();

        assert_eq!(
            config.notify.webhook.as_deref(),
            Some("https://hooks.slack.com/services/T/B/X")
        );
        assert_eq!(config.notify.blocked_channel, "alerts");
        assert_eq!(config.notify.success_emoji, "rocket");
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = Config::from_map(&with(&[(vars::SECRET_KEY, "hunter2")])).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}

mod target {
    use super::*;

    #[test]
    fn combined_form_splits_at_first_slash() {
        let vars = {
            let mut v = with(&[(vars::SERVICE, "prod/web/api")]);
            v.remove(vars::STACK);
            v
        };
        let config = Config::from_map(&vars).unwrap();
        assert_eq!(config.target.stack(), "prod");
        assert_eq!(config.target.service(), "web/api");
    }

    #[test]
    fn combined_form_with_stack_is_rejected() {
        let err = Config::from_map(&with(&[(vars::SERVICE, "prod/web")])).unwrap_err();
        assert!(matches!(err, Error::ConflictingStack));
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("both field and prefix"));
    }

    #[test]
    fn missing_stack_without_prefix_is_rejected() {
        let err = Config::from_map(&without(vars::STACK)).unwrap_err();
        assert!(matches!(err, Error::MissingParameter("stack")));
    }

    #[test]
    fn empty_service_after_prefix_is_rejected() {
        let mut vars = with(&[(vars::SERVICE, "prod/")]);
        vars.remove(vars::STACK);
        let err = Config::from_map(&vars).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter {
                field: "service",
                ..
            }
        ));
    }
}

mod image {
    use super::*;

    #[test]
    fn bare_image_gets_prefix_once() {
        let config = Config::from_map(&with(&[(vars::IMAGE, "registry.local/app:1.2")])).unwrap();
        assert_eq!(config.image.as_str(), "docker:registry.local/app:1.2");
    }

    #[test]
    fn prefixed_image_is_unchanged() {
        let config = Config::from_map(&with(&[(vars::IMAGE, "docker:app:1.2")])).unwrap();
        assert_eq!(config.image.as_str(), "docker:app:1.2");
    }
}

mod validation {
    use super::*;

    #[test]
    fn each_required_field_is_named_when_missing() {
        let cases = [
            (vars::URL, "endpoint"),
            (vars::ACCESS_KEY, "accesskey"),
            (vars::SECRET_KEY, "secretkey"),
            (vars::SERVICE, "service"),
            (vars::IMAGE, "image"),
            (vars::START_FIRST, "startfirst"),
            (vars::CONFIRM, "confirm"),
            (vars::BATCH_SIZE, "batch size"),
            (vars::BATCH_INTERVAL, "batch interval"),
            (vars::TIMEOUT, "timeout"),
        ];

        for (key, field) in cases {
            let err = Config::from_map(&without(key)).unwrap_err();
            match err {
                Error::MissingParameter(name) => assert_eq!(name, field, "{key}"),
                other => panic!("{key}: expected missing parameter, got {other}"),
            }
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = Config::from_map(&with(&[(vars::ACCESS_KEY, "   ")])).unwrap_err();
        assert!(matches!(err, Error::MissingParameter("accesskey")));
    }

    #[test]
    fn malformed_values_name_their_field() {
        let cases = [
            (vars::TIMEOUT, "forever", "timeout"),
            (vars::BATCH_SIZE, "many", "batch size"),
            (vars::BATCH_SIZE, "0", "batch size"),
            (vars::BATCH_INTERVAL, "5 parsecs", "batch interval"),
            (vars::CONFIRM, "sure", "confirm"),
            (vars::START_FIRST, "maybe", "startfirst"),
            (vars::URL, "not a url", "endpoint"),
            (vars::RETRY_JITTER, "lots", "retry jitter"),
        ];

        for (key, value, field) in cases {
            let err = Config::from_map(&with(&[(key, value)])).unwrap_err();
            assert!(
                matches!(&err, Error::InvalidParameter { field: f, .. } if *f == field),
                "{key}={value}: got {err}"
            );
            assert_eq!(err.exit_code(), 2);
        }
    }
}

mod process_env {
    use super::*;

    #[test]
    fn from_env_reads_plugin_variables() {
        let pairs: Vec<(String, Option<String>)> = vars::ALL
            .iter()
            .map(|k| (k.to_string(), base_vars().get(*k).cloned()))
            .collect();

        temp_env::with_vars(pairs, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.target.to_string(), "prod/web");
            assert_eq!(config.image.as_str(), "docker:myapp:v2");
        });
    }

    #[test]
    fn from_env_fails_without_settings() {
        let pairs: Vec<(&str, Option<&str>)> = vars::ALL.iter().map(|k| (*k, None)).collect();

        temp_env::with_vars(pairs, || {
            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, Error::MissingParameter("endpoint")));
        });
    }
}
