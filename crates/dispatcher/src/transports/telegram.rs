//! TelegramTransport - Bot API `sendMessage` over HTTPS

use std::fmt;
use std::time::Duration;

use contracts::{ChatId, DeliveryError, Transport, TransportConfig};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::DispatcherError;

const TRANSPORT_NAME: &str = "telegram";

/// Configuration for TelegramTransport
#[derive(Clone)]
pub struct TelegramConfig {
    /// API base URL, without trailing slash
    pub api_base: String,
    pub token: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl TelegramConfig {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            token: token.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Extract the telegram settings from the transport section
    ///
    /// # Errors
    /// `TransportSetup` when no token is configured.
    pub fn from_transport(config: &TransportConfig) -> Result<Self, DispatcherError> {
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                DispatcherError::transport_setup(TRANSPORT_NAME, "bot token is not configured")
            })?;

        Ok(Self {
            api_base: config.api_base.clone(),
            token: token.to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

/// Transport that posts to the Telegram Bot API
pub struct TelegramTransport {
    client: reqwest::Client,
    /// `{api_base}/bot{token}/sendMessage`; never logged
    endpoint: String,
}

impl TelegramTransport {
    /// Create a new TelegramTransport
    ///
    /// # Errors
    /// `TransportSetup` if the HTTP client cannot be built.
    pub fn new(config: TelegramConfig) -> Result<Self, DispatcherError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DispatcherError::transport_setup(TRANSPORT_NAME, e.to_string()))?;

        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.api_base.trim_end_matches('/'),
            config.token
        );

        debug!(api_base = %config.api_base, "TelegramTransport created");
        Ok(Self { client, endpoint })
    }

    /// Create from the transport config section
    pub fn from_config(config: &TransportConfig) -> Result<Self, DispatcherError> {
        Self::new(TelegramConfig::from_transport(config)?)
    }
}

impl fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}

/// Numeric ids go out as integers, `@channel` handles as strings
fn chat_id_value(destination: &ChatId) -> Result<Value, DeliveryError> {
    if let Some(id) = destination.as_i64() {
        return Ok(json!(id));
    }
    if destination.len() > 1 && destination.starts_with('@') {
        return Ok(json!(destination.as_str()));
    }
    Err(DeliveryError::invalid_destination(
        destination.as_str(),
        "expected a numeric chat id or an @username",
    ))
}

impl Transport for TelegramTransport {
    fn name(&self) -> &str {
        TRANSPORT_NAME
    }

    #[instrument(
        name = "telegram_transport_send",
        skip(self, text),
        fields(chat_id = %destination)
    )]
    async fn send(&self, destination: &ChatId, text: &str) -> Result<(), DeliveryError> {
        let body = json!({
            "chat_id": chat_id_value(destination)?,
            "text": text,
        });

        // without_url(): the request URL carries the bot token
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::unreachable(destination.as_str(), e.without_url().to_string()))?;

        let status = response.status();
        match response.json::<ApiResponse>().await {
            Ok(api) if status.is_success() && api.ok => Ok(()),
            Ok(api) => Err(DeliveryError::rejected(
                destination.as_str(),
                api.error_code.unwrap_or(status.as_u16()),
                api.description
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
            )),
            Err(e) if status.is_success() => Err(DeliveryError::rejected(
                destination.as_str(),
                status.as_u16(),
                format!("unreadable response: {}", e.without_url()),
            )),
            Err(_) => Err(DeliveryError::rejected(
                destination.as_str(),
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123456:secret-token";

    fn transport_for(server: &MockServer) -> TelegramTransport {
        TelegramTransport::new(TelegramConfig::new(server.uri(), TOKEN)).unwrap()
    }

    #[tokio::test]
    async fn test_numeric_chat_id_sent_as_integer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_partial_json(json!({"chat_id": -1001234, "text": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let result = transport.send(&ChatId::from("-1001234"), "hello").await;
        assert!(result.is_ok(), "send failed: {result:?}");
    }

    #[tokio::test]
    async fn test_channel_handle_sent_as_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"chat_id": "@relay_news"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        assert!(transport
            .send(&ChatId::from("@relay_news"), "hi")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_rejection_maps_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let err = transport
            .send(&ChatId::from("42"), "hi")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DeliveryError::rejected("42", 403, "Forbidden: bot was blocked by the user")
        );
    }

    #[tokio::test]
    async fn test_ok_false_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let err = transport.send(&ChatId::from("7"), "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_invalid_destination_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(0)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let err = transport
            .send(&ChatId::from("not-a-chat"), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidDestination { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_hides_token() {
        // Nothing listens on port 1
        let transport =
            TelegramTransport::new(TelegramConfig::new("http://127.0.0.1:1", TOKEN)).unwrap();

        let err = transport.send(&ChatId::from("42"), "hi").await.unwrap_err();

        assert!(matches!(err, DeliveryError::Unreachable { .. }));
        assert!(!err.to_string().contains("secret-token"));
    }

    #[test]
    fn test_config_requires_token() {
        let config = TransportConfig::default();
        assert!(TelegramConfig::from_transport(&config).is_err());

        let config = TransportConfig {
            token: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(TelegramConfig::from_transport(&config).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TelegramConfig::new("https://api.telegram.org", TOKEN);
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
