use crate::error::AgentError;
use serde_json::{json, Value};

pub(crate) const FINAL_ANSWER_TOOL_NAME: &str = "final_answer";

/// Extract tool_call_id from a tool call JSON object
pub(super) fn extract_tool_call_id(tool_call: &Value) -> &str {
    tool_call
        .get("id")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
}

/// Extract the function object and its name from a tool call JSON object
pub(super) fn extract_function_info(tool_call: &Value) -> Option<(&Value, Option<&str>)> {
    let function = tool_call.get("function")?;
    let function_name = function.get("name").and_then(|value| value.as_str());
    Some((function, function_name))
}

/// Extract arguments string from function object
pub(super) fn extract_arguments_str(function: &Value) -> &str {
    function
        .get("arguments")
        .and_then(|value| value.as_str())
        .unwrap_or("")
}

/// Parse function arguments from JSON string; an empty string means no arguments
pub(super) fn parse_function_arguments(
    arguments_str: &str,
    function_name: &str,
) -> Result<Value, AgentError> {
    if arguments_str.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(arguments_str).map_err(|err| {
        AgentError::InvalidFunctionCall(format!(
            "Failed to parse arguments for tool '{}': {}",
            function_name, err
        ))
    })
}

/// Non-empty `answer` field of a final_answer call
pub(super) fn final_answer_text(arguments: &Value) -> Result<String, AgentError> {
    let answer = arguments
        .get("answer")
        .and_then(|value| value.as_str())
        .map(str::trim)
        .unwrap_or_default();
    if answer.is_empty() {
        return Err(AgentError::InvalidFunctionCall(
            "final_answer requires a non-empty `answer` field".to_string(),
        ));
    }
    Ok(answer.to_string())
}

/// Generate the final_answer tool definition
pub(crate) fn final_answer_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": FINAL_ANSWER_TOOL_NAME,
            "description": "Signal that the agent has completed the task by providing the final answer.",
            "parameters": {
                "type": "object",
                "properties": {
                    "answer": {
                        "type": "string",
                        "description": "Final response for the user"
                    }
                },
                "required": ["answer"]
            }
        }
    })
}
