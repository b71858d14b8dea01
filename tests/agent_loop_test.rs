use mockito::Matcher;
use serde_json::{json, Value};
use weather_time_agent::{Agent, AgentError, AgentStep, ModelConfig};

fn tool_call_response(id: &str, name: &str, arguments: Value) -> String {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": id,
                    "type": "function",
                    "function": {
                        "name": name,
                        "arguments": arguments.to_string()
                    }
                }]
            }
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25}
    })
    .to_string()
}

fn text_response(content: &str) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

fn agent_for(server: &mockito::ServerGuard) -> Agent {
    let config = ModelConfig::new("sk-test")
        .with_api_base(server.url())
        .with_model_name("test-model");
    Agent::weather_time(config).with_max_iterations(3)
}

#[tokio::test]
async fn test_time_query_round_trip() {
    let mut server = mockito::Server::new_async().await;

    let first = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "skip_special_tokens": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(tool_call_response(
            "call_1",
            "get_current_time",
            json!({"city": "Taipei"}),
        ))
        .expect(1)
        .create_async()
        .await;

    let second = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex(r#""role":"tool""#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(tool_call_response(
            "call_2",
            "final_answer",
            json!({"answer": "It is currently evening in Taipei."}),
        ))
        .expect(1)
        .create_async()
        .await;

    let result = agent_for(&server)
        .run_with_steps("What time is it in Taipei?")
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;

    assert_eq!(result.output, "It is currently evening in Taipei.");
    assert_eq!(result.iterations, 2);
    assert!(result.is_success());
    assert_eq!(result.tools_used(), vec!["get_current_time"]);
    assert_eq!(result.tokens.as_ref().map(|t| t.total_tokens), Some(50));

    let observation = result
        .steps
        .iter()
        .find_map(|step| match step {
            AgentStep::Observation { result, .. } => Some(result.clone()),
            _ => None,
        })
        .unwrap();
    let payload: Value = serde_json::from_str(&observation).unwrap();
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["timezone"], "Asia/Taipei");
}

#[tokio::test]
async fn test_plain_reply_gets_reminder() {
    let mut server = mockito::Server::new_async().await;

    let _plain = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_response("It is sunny."))
        .expect(1)
        .create_async()
        .await;

    let _final = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(tool_call_response(
            "call_9",
            "final_answer",
            json!({"answer": "It is sunny in New York."}),
        ))
        .create_async()
        .await;

    let result = agent_for(&server)
        .run_with_steps("Weather in New York?")
        .await
        .unwrap();

    assert_eq!(result.output, "It is sunny in New York.");
    assert!(result
        .steps
        .iter()
        .any(|step| matches!(step, AgentStep::Reminder { .. })));
}

#[tokio::test]
async fn test_max_iterations() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(tool_call_response(
            "call_1",
            "get_weather",
            json!({"city": "New York"}),
        ))
        .expect(3)
        .create_async()
        .await;

    let err = agent_for(&server).run("Weather?").await.unwrap_err();
    assert!(matches!(err, AgentError::MaxIterations(3)));
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": {"message": "invalid api key"}}).to_string())
        .create_async()
        .await;

    let err = agent_for(&server).run("Weather?").await.unwrap_err();
    match err {
        AgentError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid api key");
        }
        other => panic!("unexpected error: {other}"),
    }
}
