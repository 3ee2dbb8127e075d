use reqwest::StatusCode;
use thiserror::Error;

use crate::provider::ProviderId;

/// Every failure a fetch can surface. Nothing here is retried by the library.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing or unusable configuration, most commonly an absent API key.
    #[error("{0}")]
    Configuration(String),

    #[error("Failed to reach {provider} ({context}): {source}")]
    Transport {
        provider: ProviderId,
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status. `body` is kept verbatim.
    #[error("{provider} {context} request failed with status {status}: {}", truncate_body(.body))]
    Provider {
        provider: ProviderId,
        context: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to decode {provider} {context} response: {message}")]
    Decode {
        provider: ProviderId,
        context: &'static str,
        message: String,
    },

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}

impl WeatherError {
    pub(crate) fn decode(
        provider: ProviderId,
        context: &'static str,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Decode {
            provider,
            context,
            message: message.to_string(),
        }
    }

    pub(crate) fn missing_api_key(provider: ProviderId) -> Self {
        Self::Configuration(format!(
            "No API key configured for provider '{provider}'.\n\
             Hint: run `weather configure {provider}` and enter your API key."
        ))
    }

    /// HTTP status of a provider failure, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_truncates_long_bodies() {
        let err = WeatherError::Provider {
            provider: ProviderId::WeatherApi,
            context: "forecast",
            status: StatusCode::BAD_REQUEST,
            body: "é".repeat(500),
        };

        let msg = err.to_string();
        assert!(msg.starts_with("weatherapi forecast request failed with status 400 Bad Request"));
        assert!(msg.ends_with("..."));
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

        match err {
            WeatherError::Provider { body, .. } => assert_eq!(body.chars().count(), 500),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_bodies_are_shown_verbatim() {
        assert_eq!(truncate_body("{\"error\":1}"), "{\"error\":1}");
    }

    #[test]
    fn not_found_names_the_location() {
        let err = WeatherError::NotFound("Nowhereville".into());
        assert_eq!(err.to_string(), "Location not found: Nowhereville");
        assert_eq!(err.status(), None);
    }
}
