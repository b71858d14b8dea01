use super::{
    openai_client::ChatCompletionRequest,
    tool_call_utils::{
        extract_arguments_str, extract_function_info, extract_tool_call_id,
        final_answer_text, final_answer_tool_definition, parse_function_arguments,
        FINAL_ANSWER_TOOL_NAME,
    },
};
use crate::{
    core::{agent::Agent, memory::AgentMemory, steps::AgentStep},
    error::{AgentError, Result},
    types::result::{RunResult, TokenUsage},
};
use serde_json::{json, Value};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Pull the assistant message out of a chat-completions response
fn assistant_message(response: &Value) -> Result<&Value> {
    let choices = response
        .get("choices")
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            AgentError::InvalidFunctionCall(
                "Missing 'choices' array in completion response".to_string(),
            )
        })?;

    choices
        .first()
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            AgentError::InvalidFunctionCall(
                "Completion response missing assistant message".to_string(),
            )
        })
}

fn token_usage(response: &Value) -> Option<TokenUsage> {
    let usage = response.get("usage")?;
    Some(TokenUsage {
        prompt_tokens: u32::try_from(usage.get("prompt_tokens")?.as_u64()?).ok()?,
        completion_tokens: u32::try_from(usage.get("completion_tokens")?.as_u64()?).ok()?,
        total_tokens: u32::try_from(usage.get("total_tokens")?.as_u64()?).ok()?,
    })
}

/// Record a rejected call as an action/observation pair so the transcript
/// stays well-formed for the next request.
fn record_failed_call(
    memory: &mut AgentMemory,
    tool_call_id: &str,
    tool_name: &str,
    arguments: Value,
    error: AgentError,
) {
    memory.add_step(AgentStep::Action {
        tool_name: tool_name.to_string(),
        tool_call_id: tool_call_id.to_string(),
        arguments,
    });
    memory.add_step(AgentStep::Observation {
        tool_call_id: tool_call_id.to_string(),
        result: error.to_error_payload().to_string(),
        is_error: true,
    });
}

impl Agent {
    /// Run the tool-calling loop until the model calls `final_answer`
    pub async fn run_with_steps(&self, prompt: &str) -> Result<RunResult> {
        let start_time = Instant::now();
        let mut memory = AgentMemory::new(Some(self.instruction().to_string()));
        let mut tokens: Option<TokenUsage> = None;

        memory.add_step(AgentStep::Task {
            content: prompt.to_string(),
        });

        let mut tools = self.function_factory().get_openai_tools();
        tools.push(final_answer_tool_definition());

        for iteration in 1..=self.max_iterations() {
            debug!(iteration, model = self.model(), "Requesting completion");

            let request_body = ChatCompletionRequest::new(self.model(), memory.as_messages())
                .with_max_tokens(self.max_tokens())
                .with_tools(tools.clone())
                .with_tool_choice(json!("auto"))
                .with_extra_body(self.extra_body().clone())
                .into_value();

            let response = timeout(self.timeout(), self.make_raw_request(&request_body))
                .await
                .map_err(|_| AgentError::Timeout("Model API call timed out".to_string()))??;

            if let Some(usage) = token_usage(&response) {
                tokens.get_or_insert_with(TokenUsage::default).accumulate(&usage);
            }

            let message = assistant_message(&response)?;
            let tool_calls = message
                .get("tool_calls")
                .and_then(|value| value.as_array())
                .filter(|calls| !calls.is_empty());

            let Some(tool_calls) = tool_calls else {
                let answer = message
                    .get("content")
                    .and_then(|value| value.as_str())
                    .unwrap_or("")
                    .trim();

                let reminder = if answer.is_empty() {
                    "Reminder: You must call the `final_answer` tool with the completed answer to finish.".to_string()
                } else {
                    memory.add_step(AgentStep::Thought {
                        content: answer.to_string(),
                    });
                    "Reminder: Do not respond directly. Call the `final_answer` tool with the final answer instead.".to_string()
                };
                memory.add_step(AgentStep::Reminder { content: reminder });
                continue;
            };

            let turn_has_final_answer = tool_calls.iter().any(|tool_call| {
                extract_function_info(tool_call).and_then(|(_, name)| name)
                    == Some(FINAL_ANSWER_TOOL_NAME)
            });
            let mixed_final_answer = turn_has_final_answer && tool_calls.len() > 1;

            for tool_call in tool_calls {
                let tool_call_id = extract_tool_call_id(tool_call);

                let Some((function, function_name)) = extract_function_info(tool_call) else {
                    record_failed_call(
                        &mut memory,
                        tool_call_id,
                        "unknown",
                        Value::Null,
                        AgentError::InvalidFunctionCall("Tool call missing function".to_string()),
                    );
                    continue;
                };

                let function_name = match function_name {
                    Some(name) if !name.is_empty() => name,
                    _ => {
                        record_failed_call(
                            &mut memory,
                            tool_call_id,
                            "unknown",
                            Value::Null,
                            AgentError::InvalidFunctionCall(
                                "Tool call missing function name".to_string(),
                            ),
                        );
                        continue;
                    }
                };

                let arguments_str = extract_arguments_str(function);
                let arguments = match parse_function_arguments(arguments_str, function_name) {
                    Ok(arguments) => arguments,
                    Err(err) => {
                        record_failed_call(
                            &mut memory,
                            tool_call_id,
                            function_name,
                            Value::String(arguments_str.to_string()),
                            err,
                        );
                        continue;
                    }
                };

                if mixed_final_answer {
                    record_failed_call(
                        &mut memory,
                        tool_call_id,
                        function_name,
                        arguments,
                        AgentError::InvalidFunctionCall(
                            "`final_answer` must be the only tool call in a single turn"
                                .to_string(),
                        ),
                    );
                    continue;
                }

                if function_name == FINAL_ANSWER_TOOL_NAME {
                    match final_answer_text(&arguments) {
                        Ok(answer) => {
                            memory.add_step(AgentStep::FinalAnswer {
                                answer: answer.clone(),
                            });
                            return Ok(RunResult::new(
                                answer,
                                memory.into_steps(),
                                tokens,
                                start_time.elapsed(),
                                iteration,
                            ));
                        }
                        Err(err) => {
                            record_failed_call(
                                &mut memory,
                                tool_call_id,
                                function_name,
                                arguments,
                                err,
                            );
                            continue;
                        }
                    }
                }

                memory.add_step(AgentStep::Action {
                    tool_name: function_name.to_string(),
                    tool_call_id: tool_call_id.to_string(),
                    arguments: arguments.clone(),
                });

                let (result, is_error) = match self
                    .function_factory()
                    .execute_function(function_name, arguments)
                    .await
                {
                    Ok(result) => (result.to_string(), false),
                    Err(err) => {
                        warn!(tool = function_name, error = %err, "Tool execution failed");
                        (err.to_error_payload().to_string(), true)
                    }
                };

                memory.add_step(AgentStep::Observation {
                    tool_call_id: tool_call_id.to_string(),
                    result,
                    is_error,
                });
            }
        }

        Err(AgentError::MaxIterations(self.max_iterations()))
    }
}
