use crate::{
    config::ModelConfig,
    error::Result,
    services::openai_client::OpenAIClient,
    tools::{CurrentTimeTool, FunctionFactory, WeatherTool},
};
use serde_json::{Map, Value};
use std::time::Duration;

pub const AGENT_NAME: &str = "weather_time_agent";

pub const AGENT_DESCRIPTION: &str =
    "Agent to answer questions about the time and weather in a city.";

pub const DEFAULT_INSTRUCTION: &str = "You are a helpful agent who can answer user questions about the time and weather globally. \
For time queries, accept either an IANA timezone (e.g., 'Asia/Taipei') or a city name (e.g., 'Taipei'). \
When a city name is provided, the get_current_time tool resolves it by matching the last segment of the available timezones. \
If it returns a list of candidates, ask the user to choose one. \
For weather, respond with the stubbed report returned by get_weather. \
When you are ready to give the final response, you MUST call the `final_answer` tool with an `answer` string instead of replying directly.";

/// Main agent
#[derive(Debug)]
pub struct Agent {
    openai_client: OpenAIClient,
    function_factory: FunctionFactory,
    model: String,
    instruction: String,
    extra_body: Map<String, Value>,
    max_iterations: usize,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl Agent {
    pub fn new(config: ModelConfig, function_factory: FunctionFactory) -> Self {
        let mut openai_client = OpenAIClient::new(config.api_key.clone());
        openai_client.set_base_url(config.api_base.clone());
        Self {
            openai_client,
            function_factory,
            extra_body: config.extra_body(),
            model: config.model_name,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            max_iterations: 10,
            max_tokens: Some(1000),
            timeout: Duration::from_secs(120),
        }
    }

    /// Agent with the weather and current-time tools registered
    pub fn weather_time(config: ModelConfig) -> Self {
        let mut function_factory = FunctionFactory::new();
        function_factory.register_tool(WeatherTool::new());
        function_factory.register_tool(CurrentTimeTool::new());
        Self::new(config, function_factory)
    }

    /// [`Agent::weather_time`] configured from `LITELLM_MODEL_*` variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::weather_time(ModelConfig::from_env()?))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.openai_client.set_base_url(base_url);
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn function_factory(&self) -> &FunctionFactory {
        &self.function_factory
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub(crate) fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn extra_body(&self) -> &Map<String, Value> {
        &self.extra_body
    }

    /// Run the agent and return only the final answer
    pub async fn run(&self, prompt: &str) -> Result<String> {
        self.run_with_steps(prompt).await.map(|result| result.output)
    }

    pub(crate) async fn make_raw_request(&self, request_body: &Value) -> Result<Value> {
        self.openai_client
            .chat_completion(request_body, self.timeout)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_time_registers_both_tools() {
        let agent = Agent::weather_time(ModelConfig::new("sk-test"));
        assert_eq!(
            agent.function_factory().function_names(),
            vec!["get_current_time", "get_weather"]
        );
        assert_eq!(agent.model(), crate::config::DEFAULT_MODEL);
        assert!(agent.instruction().contains("final_answer"));
    }

    #[test]
    fn test_extra_body_follows_config() {
        let agent = Agent::new(ModelConfig::new("sk-test"), FunctionFactory::new());
        assert_eq!(agent.extra_body()["skip_special_tokens"], false);

        let agent = Agent::new(
            ModelConfig::new("sk-test").with_special_tokens(true),
            FunctionFactory::new(),
        );
        assert!(agent.extra_body().is_empty());
    }
}
