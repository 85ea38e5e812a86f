//! Chat-completion client for an OpenAI-compatible endpoint behind an AI gateway.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{
    application::chat::{ChatMessage, Completion, CompletionClient, CompletionError},
    config::GatewaySettings,
};

use super::error::InfraError;

const PROVIDER_PATH: [&str; 3] = ["openai", "chat", "completions"];
const GATEWAY_AUTH_HEADER: &str = "cf-aig-authorization";

/// Validated gateway endpoint and credentials.
#[derive(Clone)]
pub struct GatewayConfig {
    pub endpoint: Url,
    pub provider_token: String,
    pub gateway_token: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, InfraError> {
        let account_id = required(settings.account_id.as_deref(), "gateway.account_id")?;
        let gateway_name = required(settings.gateway_name.as_deref(), "gateway.gateway_name")?;
        let provider_token =
            required(settings.provider_token.as_deref(), "gateway.provider_token")?;
        let model = required(settings.model.as_deref(), "gateway.model")?;

        let endpoint = completion_endpoint(&settings.base_url, account_id, gateway_name)?;

        Ok(Self {
            endpoint,
            provider_token: provider_token.to_string(),
            gateway_token: settings.gateway_token.clone(),
            model: model.to_string(),
            timeout: settings.timeout,
        })
    }
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str, InfraError> {
    value.ok_or_else(|| InfraError::configuration(format!("`{key}` is not configured")))
}

/// `{base}/{account}/{gateway}/openai/chat/completions`, with each segment
/// percent-encoded.
fn completion_endpoint(base_url: &str, account_id: &str, gateway_name: &str) -> Result<Url, InfraError> {
    let mut endpoint = Url::parse(base_url).map_err(|err| {
        InfraError::configuration(format!("invalid gateway base url `{base_url}`: {err}"))
    })?;

    endpoint
        .path_segments_mut()
        .map_err(|_| {
            InfraError::configuration(format!("gateway base url `{base_url}` cannot be a base"))
        })?
        .pop_if_empty()
        .push(account_id)
        .push(gateway_name)
        .extend(PROVIDER_PATH);

    Ok(endpoint)
}

/// `reqwest`-backed [`CompletionClient`].
pub struct GatewayClient {
    config: GatewayConfig,
    http: Client,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, InfraError> {
        let http = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(config.timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build gateway client: {err}"))
            })?;
        Ok(Self { config, http })
    }

    pub fn user_agent() -> &'static str {
        concat!("gatechat/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponseBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for GatewayClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        let started_at = Instant::now();
        let body = CompletionRequestBody {
            model: &self.config.model,
            messages,
        };

        let mut request = self
            .http
            .post(self.config.endpoint.clone())
            .bearer_auth(&self.config.provider_token)
            .json(&body);
        if let Some(token) = self.config.gateway_token.as_deref() {
            request = request.header(GATEWAY_AUTH_HEADER, format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|err| CompletionError::Transport(err.to_string()))?;
        let status = response.status();

        debug!(
            target = "infra::gateway",
            status = status.as_u16(),
            elapsed_ms = started_at.elapsed().as_millis(),
            turns = messages.len(),
            "gateway responded"
        );

        if status == StatusCode::FAILED_DEPENDENCY {
            return Ok(Completion::Blocked);
        }
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| CompletionError::Transport(err.to_string()))?;
        parse_completion(&bytes)
    }
}

fn parse_completion(bytes: &[u8]) -> Result<Completion, CompletionError> {
    let body: CompletionResponseBody =
        serde_json::from_slice(bytes).map_err(|err| CompletionError::Decode(err.to_string()))?;

    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(Completion::Message)
        .ok_or(CompletionError::MissingContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GatewaySettings {
        GatewaySettings {
            base_url: "https://gateway.ai.cloudflare.com/v1".to_string(),
            account_id: Some("acct".to_string()),
            gateway_name: Some("corp gw".to_string()),
            provider_token: Some("sk-test".to_string()),
            gateway_token: None,
            model: Some("gpt-4o-mini".to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn endpoint_appends_account_gateway_and_provider_path() {
        let config = GatewayConfig::from_settings(&settings()).expect("config");
        assert_eq!(
            config.endpoint.as_str(),
            "https://gateway.ai.cloudflare.com/v1/acct/corp%20gw/openai/chat/completions"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let mut settings = settings();
        settings.base_url = "http://127.0.0.1:9000/".to_string();
        let config = GatewayConfig::from_settings(&settings).expect("config");
        assert_eq!(
            config.endpoint.as_str(),
            "http://127.0.0.1:9000/acct/corp%20gw/openai/chat/completions"
        );
    }

    #[test]
    fn missing_model_is_a_configuration_error() {
        let mut settings = settings();
        settings.model = None;
        let err = GatewayConfig::from_settings(&settings)
            .err()
            .expect("missing model");
        assert!(err.to_string().contains("gateway.model"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut settings = settings();
        settings.base_url = "not a url".to_string();
        assert!(GatewayConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn first_choice_content_is_extracted() {
        let body = br##"{"choices":[{"message":{"role":"assistant","content":"# Hi"}},{"message":{"content":"other"}}]}"##;
        assert_eq!(
            parse_completion(body).expect("completion"),
            Completion::Message("# Hi".to_string())
        );
    }

    #[test]
    fn empty_choices_or_null_content_is_missing_content() {
        assert!(matches!(
            parse_completion(br#"{"choices":[]}"#),
            Err(CompletionError::MissingContent)
        ));
        assert!(matches!(
            parse_completion(br#"{"choices":[{"message":{"content":null}}]}"#),
            Err(CompletionError::MissingContent)
        ));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            parse_completion(b"<html>"),
            Err(CompletionError::Decode(_))
        ));
    }
}
