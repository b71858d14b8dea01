use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::{
    config::DEFAULT_BASE_URL,
    error::{AgentError, Result},
};

const MAX_RETRIES: usize = 3;

#[derive(Clone, Debug)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub async fn chat_completion(&self, body: &Value, timeout: Duration) -> Result<Value> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let request_url = build_chat_url(&self.base_url);

        let mut attempt = 0;
        let mut backoff = Duration::from_millis(250);

        loop {
            let response = client
                .post(&request_url)
                .bearer_auth(&self.api_key)
                .header("X-Title", "weather-time-agent")
                .json(body)
                .send()
                .await?;

            let status = response.status();
            let headers = response.headers().clone();
            let response_text = response.text().await?;

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_duration = headers
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(backoff);

                if attempt < MAX_RETRIES {
                    warn!(attempt, delay_ms = retry_after_duration.as_millis() as u64, "Rate limited by model endpoint, retrying");
                    tokio::time::sleep(retry_after_duration).await;
                    attempt += 1;
                    backoff *= 2;
                    continue;
                }

                return Err(AgentError::RateLimit {
                    retry_after: retry_after_duration.as_secs().max(1),
                });
            }

            if status.is_server_error() && attempt < MAX_RETRIES {
                warn!(attempt, status = status.as_u16(), "Model endpoint server error, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
                backoff *= 2;
                continue;
            }

            if !status.is_success() {
                let api_message = serde_json::from_str::<Value>(&response_text)
                    .ok()
                    .and_then(|json| {
                        json.get("error")
                            .and_then(|error| error.get("message"))
                            .and_then(|value| value.as_str())
                            .map(|s| s.to_string())
                    })
                    .unwrap_or(response_text);

                return Err(AgentError::Api {
                    status: status.as_u16(),
                    message: api_message,
                });
            }

            let response_json: Value = serde_json::from_str(&response_text)?;

            if let Some(error) = response_json.get("error").filter(|error| !error.is_null()) {
                let error_message = error
                    .get("message")
                    .and_then(|value| value.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| error.to_string());
                return Err(AgentError::Api {
                    status: status.as_u16(),
                    message: error_message,
                });
            }

            return Ok(response_json);
        }
    }
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    max_tokens: Option<u32>,
    extra_body: Map<String, Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
            extra_body: Map::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Provider-specific fields merged into the top level of the body
    pub fn with_extra_body(mut self, extra_body: Map<String, Value>) -> Self {
        self.extra_body = extra_body;
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }

        if let Some(tool_choice) = self.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(object) = body.as_object_mut() {
            for (key, value) in self.extra_body {
                object.entry(key).or_insert(value);
            }
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chat_url() {
        assert_eq!(
            build_chat_url("http://localhost:4000/v1/"),
            "http://localhost:4000/v1/chat/completions"
        );
        assert_eq!(
            build_chat_url("http://localhost:4000/v1/chat/completions"),
            "http://localhost:4000/v1/chat/completions"
        );
    }

    #[test]
    fn test_extra_body_is_merged() {
        let mut extra = Map::new();
        extra.insert("skip_special_tokens".to_string(), json!(false));
        extra.insert("model".to_string(), json!("ignored"));

        let body = ChatCompletionRequest::new("gpt-test", vec![])
            .with_max_tokens(Some(256))
            .with_extra_body(extra)
            .into_value();

        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["skip_special_tokens"], false);
        assert!(body.get("tools").is_none());
    }
}
