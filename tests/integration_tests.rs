use jiff::{tz::offset, Timestamp};
use serde_json::json;
use std::sync::Arc;
use weather_time_agent::{
    timezone::{
        final_segment, FixedCatalog, FixedClock, Resolution, TimezoneResolver, MAX_CANDIDATES,
    },
    tools::{CurrentTimeTool, WeatherTool},
    AgentError, FunctionFactory, Tool,
};

#[tokio::test]
async fn test_weather_tool() {
    let weather = WeatherTool::new();

    let result = weather.execute(json!({"city": "New York"})).await.unwrap();
    assert_eq!(result["status"], "success");
    assert!(result["report"].as_str().unwrap().contains("New York"));

    let result = weather.execute(json!({"city": "Taipei"})).await.unwrap();
    assert_eq!(result["status"], "error");
    assert!(result["error_message"]
        .as_str()
        .unwrap()
        .contains("'Taipei'"));
}

#[tokio::test]
async fn test_function_factory() {
    let mut factory = FunctionFactory::new();
    factory.register_tool(WeatherTool::new());
    factory.register_tool(CurrentTimeTool::new());

    assert!(factory.has_function("get_weather"));
    assert!(factory.has_function("get_current_time"));
    assert!(!factory.has_function("calculator"));

    let result = factory
        .execute_function("get_current_time", json!({"city": "Asia/Taipei"}))
        .await
        .unwrap();
    assert_eq!(result["status"], "success");
    assert_eq!(result["timezone"], "Asia/Taipei");

    let err = factory
        .execute_function("calculator", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::ToolNotFound(_)));

    let tools = factory.get_openai_tools();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["function"]["name"], "get_current_time");
    assert_eq!(tools[1]["function"]["name"], "get_weather");
}

#[test]
fn test_tool_schemas() {
    for tool in [
        Box::new(WeatherTool::new()) as Box<dyn Tool>,
        Box::new(CurrentTimeTool::new()),
    ] {
        let schema = tool.parameters_schema();
        assert!(schema.is_object());
        assert!(schema["properties"].get("city").is_some());
    }
}

#[test]
fn test_error_handling() {
    let error = AgentError::ToolExecution("Test error".to_string());
    assert_eq!(error.error_code(), "TOOL_EXECUTION_ERROR");
    assert!(error.to_string().contains("Test error"));

    let payload = error.to_error_payload();
    assert_eq!(payload["error"]["code"], "TOOL_EXECUTION_ERROR");
    assert_eq!(payload["error"]["retryable"], false);
}

#[test]
fn test_system_taipei() {
    let resolver = TimezoneResolver::system();

    let direct = resolver.resolve_time("Asia/Taipei");
    assert_eq!(direct.timezone(), Some("Asia/Taipei"));

    let by_city = resolver.resolve_time("Taipei");
    assert_eq!(by_city.timezone(), Some("Asia/Taipei"));

    if let Resolution::Resolved {
        report, local_time, ..
    } = by_city
    {
        assert!(report.starts_with("The current time in Taipei is "));
        assert!(report.ends_with("+0800"));
        assert_eq!(local_time.offset().seconds(), 8 * 3600);
    }
}

#[test]
fn test_system_new_york_spellings() {
    let resolver = TimezoneResolver::system();
    let expected = resolver.search("New York");
    assert!(expected.iter().any(|name| name == "America/New_York"));

    for query in ["new_york", "New-York", "  NEW YORK "] {
        assert_eq!(resolver.search(query), expected);
    }
}

#[test]
fn test_system_london_depends_on_catalog() {
    let resolver = TimezoneResolver::system();
    let sharing = resolver
        .catalog()
        .names()
        .iter()
        .filter(|name| final_segment(name).eq_ignore_ascii_case("London"))
        .count();

    let resolution = resolver.resolve_time("London");
    if sharing > 1 {
        assert!(resolution.candidates().is_some());
    } else {
        assert_eq!(resolution.timezone(), Some("Europe/London"));
    }
}

#[test]
fn test_system_ambiguous_results_are_sorted_and_capped() {
    let resolver = TimezoneResolver::system();
    // Matches many final segments (Amsterdam, Araguaina, Asmara, ...).
    let resolution = resolver.resolve_time("a");
    let candidates = resolution.candidates().unwrap();
    assert_eq!(candidates.len(), MAX_CANDIDATES);
    assert!(candidates.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_system_failures() {
    let resolver = TimezoneResolver::system();
    assert_eq!(
        resolver.resolve_time("Nonexistent_Place_Zzz").error_code(),
        Some("UNRESOLVABLE_NAME")
    );
    assert_eq!(resolver.resolve_time("").error_code(), Some("INVALID_INPUT"));
}

#[test]
fn test_lowercase_identifier_agrees_across_catalogs() {
    let fixed = TimezoneResolver::new(
        Arc::new(FixedCatalog::new().with_zone("Asia/Taipei", offset(8))),
        Arc::new(FixedClock::new(Timestamp::UNIX_EPOCH)),
    );
    let system = TimezoneResolver::system();

    let expected = fixed.resolve_time("asia/taipei");
    let actual = system.resolve_time("asia/taipei");
    assert_eq!(expected.error_code(), Some("UNRESOLVABLE_NAME"));
    assert_eq!(actual.error_code(), expected.error_code());
    assert_eq!(actual.timezone(), None);
}

#[test]
fn test_system_whitespace_only_is_ambiguous() {
    let resolution = TimezoneResolver::system().resolve_time("   ");
    assert_eq!(resolution.error_code(), Some("AMBIGUOUS_NAME"));
    assert_eq!(resolution.candidates().map(<[String]>::len), Some(MAX_CANDIDATES));
}
