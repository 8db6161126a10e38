//! LLM provider integrations for SQL generation.
//!
//! This module turns a user question into raw model text. Every provider
//! receives the same three inputs: the question, the sampling temperature and
//! the system prompt describing the schema.
//!
//! # Supported Providers
//!
//! | Provider | Endpoint | Authentication |
//! |----------|----------|----------------|
//! | OpenAI | `api.openai.com` | Bearer token |
//! | Anthropic | `api.anthropic.com` | x-api-key header |
//! | Ollama | Local (configurable) | None |
//! | YandexGPT | `llm.api.cloud.yandex.net` | Api-Key header + folder id |
//!
//! # Blocking
//!
//! [`CompletionBackend::complete`] blocks the calling thread. Async callers
//! run it through `tokio::task::spawn_blocking`. There is no retry: transport
//! and service errors are returned as-is.
//!
//! # Example
//!
//! ```
//! use nl_sql_bridge::llm::{LlmClient, LlmProvider, Temperature};
//!
//! let provider = LlmProvider::Ollama {
//!     base_url: "http://localhost:11434".into(),
//!     model:    "llama3.2".into()
//! };
//!
//! let client = LlmClient::new(provider);
//! assert_eq!(Temperature::default().value(), 0.1);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppResult, config_error, http_error, llm_api_error};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const YANDEX_URL: &str = "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";
const MAX_TOKENS: u32 = 2000;

/// Sampling temperature in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f32);

impl Temperature {
    /// Low-creativity setting used for SQL generation
    pub const DEFAULT: Self = Self(0.1);

    pub fn new(value: f32) -> AppResult<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(config_error(format!(
                "Temperature must be within [0, 1], got {}",
                value
            )))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Text completion service.
pub trait CompletionBackend: Send + Sync {
    /// Ask the model to answer `question` under `system_prompt`.
    ///
    /// Blocks until the service responds.
    fn complete(
        &self,
        question: &str,
        temperature: Temperature,
        system_prompt: &str
    ) -> AppResult<String>;
}

/// LLM provider configuration with authentication credentials.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// OpenAI API (GPT-4o, GPT-4, etc.)
    OpenAI {
        /// API key (sk-...)
        api_key: String,
        /// Model identifier (e.g., "gpt-4o-mini")
        model:   String
    },
    /// Anthropic API (Claude models)
    Anthropic {
        /// API key
        api_key: String,
        /// Model identifier (e.g., "claude-sonnet-4-20250514")
        model:   String
    },
    /// Local Ollama instance
    Ollama {
        /// Base URL (e.g., "http://localhost:11434")
        base_url: String,
        /// Model name (e.g., "llama3.2", "codellama")
        model:    String
    },
    /// Yandex Foundation Models
    Yandex {
        /// API key
        api_key:   String,
        /// Cloud folder the model is billed to
        folder_id: String,
        /// Model name (e.g., "yandexgpt-lite")
        model:     String
    }
}

impl LlmProvider {
    /// Provider name for logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI {
                ..
            } => "OpenAI",
            Self::Anthropic {
                ..
            } => "Anthropic",
            Self::Ollama {
                ..
            } => "Ollama",
            Self::Yandex {
                ..
            } => "YandexGPT"
        }
    }
}

/// Blocking HTTP client for LLM completion.
///
/// The underlying `reqwest` blocking client is built per call, on the thread
/// that makes the call, so it is never created or dropped inside the async
/// runtime. Requests have no timeout: a slow model holds only its own
/// question.
#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: LlmProvider
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role:    &'a str,
    content: &'a str
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model:       &'a str,
    temperature: f32,
    messages:    Vec<ChatMessage<'a>>
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: String
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model:       &'a str,
    max_tokens:  u32,
    temperature: f32,
    system:      &'a str,
    messages:    Vec<ChatMessage<'a>>
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model:   &'a str,
    prompt:  &'a str,
    system:  &'a str,
    stream:  bool,
    options: OllamaOptions
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct YandexRequest<'a> {
    model_uri:          String,
    completion_options: YandexCompletionOptions,
    messages:           Vec<YandexMessage<'a>>
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct YandexCompletionOptions {
    stream:      bool,
    temperature: f32,
    max_tokens:  String
}

#[derive(Serialize)]
struct YandexMessage<'a> {
    role: &'a str,
    text: &'a str
}

#[derive(Deserialize)]
struct YandexResponse {
    result: YandexResult
}

#[derive(Deserialize)]
struct YandexResult {
    alternatives: Vec<YandexAlternative>
}

#[derive(Deserialize)]
struct YandexAlternative {
    message: YandexResponseMessage
}

#[derive(Deserialize)]
struct YandexResponseMessage {
    text: String
}

impl LlmClient {
    /// Create new LLM client
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider
        }
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    fn http(&self) -> AppResult<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(http_error)
    }

    fn post<T: Serialize>(
        &self,
        request: reqwest::blocking::RequestBuilder,
        body: &T
    ) -> AppResult<reqwest::blocking::Response> {
        let response = request.json(body).send().map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(llm_api_error(format!(
                "{} API error {}: {}",
                self.provider.name(),
                status,
                text
            )));
        }
        Ok(response)
    }

    fn call_openai(
        &self,
        api_key: &str,
        model: &str,
        question: &str,
        temperature: Temperature,
        system_prompt: &str
    ) -> AppResult<String> {
        let request = OpenAIRequest {
            model,
            temperature: temperature.value(),
            messages: vec![
                ChatMessage {
                    role:    "system",
                    content: system_prompt
                },
                ChatMessage {
                    role:    "user",
                    content: question
                },
            ]
        };
        let http = self.http()?;
        let builder = http
            .post(OPENAI_URL)
            .header("Authorization", format!("Bearer {}", api_key));
        let result: OpenAIResponse = self.post(builder, &request)?.json().map_err(http_error)?;
        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| llm_api_error("Empty response from OpenAI"))
    }

    fn call_anthropic(
        &self,
        api_key: &str,
        model: &str,
        question: &str,
        temperature: Temperature,
        system_prompt: &str
    ) -> AppResult<String> {
        let request = AnthropicRequest {
            model,
            max_tokens: MAX_TOKENS,
            temperature: temperature.value(),
            system: system_prompt,
            messages: vec![ChatMessage {
                role:    "user",
                content: question
            }]
        };
        let http = self.http()?;
        let builder = http
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01");
        let result: AnthropicResponse = self.post(builder, &request)?.json().map_err(http_error)?;
        result
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| llm_api_error("Empty response from Anthropic"))
    }

    fn call_ollama(
        &self,
        base_url: &str,
        model: &str,
        question: &str,
        temperature: Temperature,
        system_prompt: &str
    ) -> AppResult<String> {
        let request = OllamaRequest {
            model,
            prompt: question,
            system: system_prompt,
            stream: false,
            options: OllamaOptions {
                temperature: temperature.value()
            }
        };
        let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
        let http = self.http()?;
        let result: OllamaResponse = self.post(http.post(&url), &request)?.json().map_err(http_error)?;
        Ok(result.response)
    }

    fn call_yandex(
        &self,
        api_key: &str,
        folder_id: &str,
        model: &str,
        question: &str,
        temperature: Temperature,
        system_prompt: &str
    ) -> AppResult<String> {
        let request = YandexRequest {
            model_uri:          format!("gpt://{}/{}", folder_id, model),
            completion_options: YandexCompletionOptions {
                stream:      false,
                temperature: temperature.value(),
                max_tokens:  MAX_TOKENS.to_string()
            },
            messages:           vec![
                YandexMessage {
                    role: "system",
                    text: system_prompt
                },
                YandexMessage {
                    role: "user",
                    text: question
                },
            ]
        };
        let http = self.http()?;
        let builder = http
            .post(YANDEX_URL)
            .header("Authorization", format!("Api-Key {}", api_key))
            .header("x-folder-id", folder_id);
        let result: YandexResponse = self.post(builder, &request)?.json().map_err(http_error)?;
        result
            .result
            .alternatives
            .into_iter()
            .next()
            .map(|a| a.message.text)
            .ok_or_else(|| llm_api_error("Empty response from YandexGPT"))
    }
}

impl CompletionBackend for LlmClient {
    fn complete(
        &self,
        question: &str,
        temperature: Temperature,
        system_prompt: &str
    ) -> AppResult<String> {
        tracing::debug!(
            provider = self.provider.name(),
            temperature = temperature.value(),
            "requesting completion"
        );
        match &self.provider {
            LlmProvider::OpenAI {
                api_key,
                model
            } => self.call_openai(api_key, model, question, temperature, system_prompt),
            LlmProvider::Anthropic {
                api_key,
                model
            } => self.call_anthropic(api_key, model, question, temperature, system_prompt),
            LlmProvider::Ollama {
                base_url,
                model
            } => self.call_ollama(base_url, model, question, temperature, system_prompt),
            LlmProvider::Yandex {
                api_key,
                folder_id,
                model
            } => self.call_yandex(
                api_key,
                folder_id,
                model,
                question,
                temperature,
                system_prompt
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_bounds() {
        assert!(Temperature::new(0.0).is_ok());
        assert!(Temperature::new(1.0).is_ok());
        assert!(Temperature::new(-0.1).is_err());
        assert!(Temperature::new(1.5).is_err());
        assert!(Temperature::new(f32::NAN).is_err());
    }

    #[test]
    fn test_yandex_request_shape() {
        let request = YandexRequest {
            model_uri:          String::from("gpt://folder/yandexgpt-lite"),
            completion_options: YandexCompletionOptions {
                stream:      false,
                temperature: 0.1,
                max_tokens:  String::from("2000")
            },
            messages:           vec![YandexMessage {
                role: "user",
                text: "hi"
            }]
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["modelUri"], "gpt://folder/yandexgpt-lite");
        assert_eq!(json["completionOptions"]["maxTokens"], "2000");
        assert_eq!(json["messages"][0]["text"], "hi");
    }

    #[test]
    fn test_ollama_response_parse() {
        let parsed: OllamaResponse =
            serde_json::from_str(r#"{"response":"SELECT 1","done":true}"#).unwrap();
        assert_eq!(parsed.response, "SELECT 1");
    }

    /// Answer one HTTP request with `body` after `delay`
    fn serve_once(delay: Duration, body: &'static str) -> String {
        use std::{
            io::{Read, Write},
            net::TcpListener
        };

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            std::thread::sleep(delay);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}", addr)
    }

    fn ollama_client(base_url: String) -> LlmClient {
        LlmClient::new(LlmProvider::Ollama {
            base_url,
            model: String::from("llama3.2")
        })
    }

    #[test]
    fn test_ollama_round_trip() {
        let base_url = serve_once(Duration::from_millis(50), r#"{"response":"SELECT 7"}"#);
        let reply = ollama_client(base_url)
            .complete("q", Temperature::default(), "prompt")
            .unwrap();
        assert_eq!(reply, "SELECT 7");
    }

    #[test]
    #[ignore = "waits past reqwest's 30s default timeout"]
    fn test_slow_model_is_awaited() {
        let base_url = serve_once(Duration::from_secs(35), r#"{"response":"SELECT 1"}"#);
        let reply = ollama_client(base_url)
            .complete("q", Temperature::default(), "prompt")
            .unwrap();
        assert_eq!(reply, "SELECT 1");
    }
}
