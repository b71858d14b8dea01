use super::{
    tool::{parameters_schema_for, parse_parameters, ToolFuture},
    Tool,
};
use serde::{Deserialize, Serialize};

/// Parameters for weather queries
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WeatherParams {
    /// Name of the city, e.g. "New York"
    pub city: String,
}

/// Weather lookup outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WeatherReport {
    Success { report: String },
    Error { error_message: String },
}

/// Stubbed weather data; only New York is known.
pub fn lookup_weather(city: &str) -> WeatherReport {
    if city.trim().eq_ignore_ascii_case("new york") {
        WeatherReport::Success {
            report: "The weather in New York is sunny with a temperature of 25 degrees Celsius (77 degrees Fahrenheit).".to_string(),
        }
    } else {
        WeatherReport::Error {
            error_message: format!("Weather information for '{}' is not available.", city),
        }
    }
}

/// A mock weather tool for demonstration
#[derive(Debug)]
pub struct WeatherTool;

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn description(&self) -> &'static str {
        "Retrieves the current weather report for a specified city (stub data, New York only)"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        parameters_schema_for::<WeatherParams>()
    }

    fn execute(&self, parameters: serde_json::Value) -> ToolFuture<'_> {
        Box::pin(async move {
            let params: WeatherParams = parse_parameters(parameters)?;
            let report = lookup_weather(&params.city);
            serde_json::to_value(report).map_err(|e| {
                crate::AgentError::ToolExecution(format!("Failed to serialize result: {}", e))
            })
        })
    }
}
