use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::event::DEFAULT_MAX_LISTENERS;

/// Runtime settings for the meeting hub
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: String,
    /// Upper bound for one request/response call
    pub request_timeout: Duration,
    /// Maximum number of concurrent bus listeners (open subscriptions)
    pub max_listeners: usize,
    /// Whether closing an event stream removes the participant from its room
    pub leave_on_disconnect: bool,
    /// Maximum chat / speech-to-text length in characters
    pub max_text_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            request_timeout: Duration::from_secs(10),
            max_listeners: DEFAULT_MAX_LISTENERS,
            leave_on_disconnect: true,
            max_text_len: 4096,
        }
    }
}

impl ServerConfig {
    /// Reads `MEETING_HUB_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("MEETING_HUB_ADDR").unwrap_or(defaults.bind_addr),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "MEETING_HUB_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            max_listeners: parse_or(&lookup, "MEETING_HUB_MAX_LISTENERS", defaults.max_listeners),
            leave_on_disconnect: parse_or(
                &lookup,
                "MEETING_HUB_LEAVE_ON_DISCONNECT",
                defaults.leave_on_disconnect,
            ),
            max_text_len: parse_or(&lookup, "MEETING_HUB_MAX_TEXT_LEN", defaults.max_text_len),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key = key, value = %raw, "Invalid config value, using default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert!(config.leave_on_disconnect);
        assert_eq!(config.max_listeners, DEFAULT_MAX_LISTENERS);
    }

    #[test]
    fn test_values_read_from_lookup() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("MEETING_HUB_ADDR", "127.0.0.1:8080"),
            ("MEETING_HUB_REQUEST_TIMEOUT_SECS", "3"),
            ("MEETING_HUB_MAX_LISTENERS", "2000"),
            ("MEETING_HUB_LEAVE_ON_DISCONNECT", "false"),
            ("MEETING_HUB_MAX_TEXT_LEN", "280"),
        ]));

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.max_listeners, 2000);
        assert!(!config.leave_on_disconnect);
        assert_eq!(config.max_text_len, 280);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("MEETING_HUB_MAX_LISTENERS", "lots"),
            ("MEETING_HUB_LEAVE_ON_DISCONNECT", "maybe"),
        ]));

        assert_eq!(config.max_listeners, DEFAULT_MAX_LISTENERS);
        assert!(config.leave_on_disconnect);
    }
}
