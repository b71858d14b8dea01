use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents a single step in the agent's reasoning process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// Initial task provided by the user
    Task { content: String },
    /// Assistant text that did not conclude the run
    Thought { content: String },
    /// Action step where the agent calls a tool
    Action {
        tool_name: String,
        tool_call_id: String,
        arguments: Value,
    },
    /// Observation step capturing the result of a tool execution
    Observation {
        tool_call_id: String,
        result: String,
        is_error: bool,
    },
    /// Instruction injected by the loop to steer the model back on protocol
    Reminder { content: String },
    /// Final answer from the agent
    FinalAnswer { answer: String },
}

impl AgentStep {
    /// Convert step to OpenAI message format
    pub fn to_message(&self) -> Value {
        match self {
            AgentStep::Task { content } => {
                serde_json::json!({
                    "role": "user",
                    "content": content
                })
            }
            AgentStep::Thought { content } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": content
                })
            }
            AgentStep::Action {
                tool_name,
                tool_call_id,
                arguments,
            } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": tool_call_id,
                        "type": "function",
                        "function": {
                            "name": tool_name,
                            "arguments": arguments.to_string()
                        }
                    }]
                })
            }
            AgentStep::Observation {
                tool_call_id,
                result,
                ..
            } => {
                serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": result
                })
            }
            AgentStep::Reminder { content } => {
                serde_json::json!({
                    "role": "system",
                    "content": content
                })
            }
            AgentStep::FinalAnswer { answer } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": answer
                })
            }
        }
    }

    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Task { content } => format!("🧭 Task: {}", content),
            AgentStep::Thought { content } => format!("💭 Thought: {}", content),
            AgentStep::Action {
                tool_name,
                arguments,
                ..
            } => {
                format!("🔧 Action: {}({})", tool_name, arguments)
            }
            AgentStep::Observation {
                result, is_error, ..
            } => {
                if *is_error {
                    format!("❌ Error: {}", result)
                } else {
                    format!("👁 Observation: {}", result)
                }
            }
            AgentStep::Reminder { content } => format!("📌 Reminder: {}", content),
            AgentStep::FinalAnswer { answer } => format!("✅ Final Answer: {}", answer),
        }
    }
}
