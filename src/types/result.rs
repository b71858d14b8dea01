use crate::core::steps::AgentStep;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of an agent execution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Final output from the agent
    pub output: String,
    /// All reasoning steps taken during execution
    pub steps: Vec<AgentStep>,
    /// Total tokens used (if available from API)
    pub tokens: Option<TokenUsage>,
    /// Total execution duration
    pub duration: Duration,
    /// Number of iterations used
    pub iterations: usize,
}

/// Token usage information from the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Add another turn's usage to this total
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

impl RunResult {
    pub fn new(
        output: String,
        steps: Vec<AgentStep>,
        tokens: Option<TokenUsage>,
        duration: Duration,
        iterations: usize,
    ) -> Self {
        Self {
            output,
            steps,
            tokens,
            duration,
            iterations,
        }
    }

    fn header(&self, title: &str) -> Vec<String> {
        let mut lines = vec![
            format!("=== {} ===", title),
            format!("Duration: {:.2}s", self.duration.as_secs_f64()),
            format!("Iterations: {}", self.iterations),
        ];

        if let Some(tokens) = &self.tokens {
            lines.push(format!(
                "Tokens: {} prompt + {} completion = {} total",
                tokens.prompt_tokens, tokens.completion_tokens, tokens.total_tokens
            ));
        }

        lines
    }

    /// Generate a human-readable replay of the execution
    pub fn replay(&self) -> String {
        let mut lines = self.header("Agent Execution Trace");

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        lines.push(String::new());
        lines.push("--- Final Output ---".to_string());
        lines.push(self.output.clone());

        lines.join("\n")
    }

    /// Generate a detailed explanation with full step data
    pub fn explain(&self) -> String {
        let mut lines = self.header("Agent Execution Explanation");

        lines.push(String::new());
        lines.push("--- Detailed Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("\n{}. {}", idx + 1, step.describe()));

            match step {
                AgentStep::Action {
                    tool_name,
                    tool_call_id,
                    arguments,
                } => {
                    lines.push(format!("   Tool: {}", tool_name));
                    lines.push(format!("   Call ID: {}", tool_call_id));
                    lines.push(format!("   Arguments: {}", arguments));
                }
                AgentStep::Observation {
                    tool_call_id,
                    result,
                    is_error,
                } => {
                    lines.push(format!("   Call ID: {}", tool_call_id));
                    lines.push(format!("   Error: {}", is_error));
                    lines.push(format!("   Result: {}", result));
                }
                _ => {}
            }
        }

        lines.join("\n")
    }

    /// The run ended with a final answer step
    pub fn is_success(&self) -> bool {
        matches!(self.steps.last(), Some(AgentStep::FinalAnswer { .. }))
    }

    pub fn action_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Action { .. }))
            .count()
    }

    pub fn observation_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Observation { .. }))
            .count()
    }

    /// Names of the tools called, in order
    pub fn tools_used(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                AgentStep::Action { tool_name, .. } => Some(tool_name.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RunResult {
        RunResult::new(
            "It is 12:00 in Taipei.".to_string(),
            vec![
                AgentStep::Task {
                    content: "Time in Taipei?".to_string(),
                },
                AgentStep::Action {
                    tool_name: "get_current_time".to_string(),
                    tool_call_id: "call_1".to_string(),
                    arguments: json!({"city": "Taipei"}),
                },
                AgentStep::Observation {
                    tool_call_id: "call_1".to_string(),
                    result: "{\"status\":\"success\"}".to_string(),
                    is_error: false,
                },
                AgentStep::FinalAnswer {
                    answer: "It is 12:00 in Taipei.".to_string(),
                },
            ],
            Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            Duration::from_millis(1500),
            2,
        )
    }

    #[test]
    fn test_replay_and_explain() {
        let result = sample();
        let replay = result.replay();
        assert!(replay.contains("Agent Execution Trace"));
        assert!(replay.contains("Iterations: 2"));
        assert!(replay.contains("10 prompt + 5 completion = 15 total"));
        assert!(replay.contains("Final Output"));

        let explain = result.explain();
        assert!(explain.contains("Detailed Steps"));
        assert!(explain.contains("Call ID: call_1"));
    }

    #[test]
    fn test_counts() {
        let result = sample();
        assert!(result.is_success());
        assert_eq!(result.action_count(), 1);
        assert_eq!(result.observation_count(), 1);
        assert_eq!(result.tools_used(), vec!["get_current_time"]);
    }
}
