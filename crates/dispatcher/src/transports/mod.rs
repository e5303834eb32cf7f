//! Transport implementations
//!
//! Contains LogTransport and TelegramTransport, plus `AnyTransport` for
//! picking one from configuration.

mod log;
mod telegram;

pub use self::log::LogTransport;
pub use self::telegram::{TelegramConfig, TelegramTransport};

use contracts::{ChatId, DeliveryError, Transport, TransportConfig, TransportKind};
use tracing::instrument;

use crate::error::DispatcherError;

/// Transport selected at runtime
#[derive(Debug)]
pub enum AnyTransport {
    Log(LogTransport),
    Telegram(TelegramTransport),
}

impl AnyTransport {
    /// Build the transport named by `config.kind`
    ///
    /// # Errors
    /// `TransportSetup` when the telegram transport has no token or its HTTP
    /// client cannot be built.
    #[instrument(name = "transport_from_config", skip(config), fields(kind = ?config.kind))]
    pub fn from_config(config: &TransportConfig) -> Result<Self, DispatcherError> {
        match config.kind {
            TransportKind::Log => Ok(Self::Log(LogTransport::new("log"))),
            TransportKind::Telegram => {
                let telegram = TelegramConfig::from_transport(config)?;
                Ok(Self::Telegram(TelegramTransport::new(telegram)?))
            }
        }
    }
}

impl Transport for AnyTransport {
    fn name(&self) -> &str {
        match self {
            Self::Log(t) => t.name(),
            Self::Telegram(t) => t.name(),
        }
    }

    async fn send(&self, destination: &ChatId, text: &str) -> Result<(), DeliveryError> {
        match self {
            Self::Log(t) => t.send(destination, text).await,
            Self::Telegram(t) => t.send(destination, text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_selects_log() {
        let transport = AnyTransport::from_config(&TransportConfig::default()).unwrap();
        assert!(matches!(transport, AnyTransport::Log(_)));
        assert_eq!(transport.name(), "log");
    }

    #[test]
    fn test_telegram_without_token_fails() {
        let config = TransportConfig {
            kind: TransportKind::Telegram,
            ..Default::default()
        };
        let err = AnyTransport::from_config(&config).unwrap_err();
        assert!(matches!(err, DispatcherError::TransportSetup { ref name, .. } if name == "telegram"));
    }

    #[test]
    fn test_telegram_with_token() {
        let config = TransportConfig {
            kind: TransportKind::Telegram,
            token: Some("123:abc".to_string()),
            ..Default::default()
        };
        let transport = AnyTransport::from_config(&config).unwrap();
        assert_eq!(transport.name(), "telegram");
    }
}
