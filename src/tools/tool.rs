use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{collections::HashMap, future::Future, pin::Pin};

/// Boxed future returned by [`Tool::execute`]
pub type ToolFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Value, crate::AgentError>> + Send + 'a>>;

/// A tool that can be executed by the agent
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// The name of the tool (used in function calls)
    fn name(&self) -> &'static str;

    /// A description of what the tool does
    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(&self, parameters: Value) -> ToolFuture<'_>;
}

/// JSON Schema for a parameter struct, stripped of the root metadata the
/// function-calling API does not expect.
pub fn parameters_schema_for<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    });
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    value
}

/// Deserialize tool parameters, reporting the path of the first bad field
pub fn parse_parameters<T: DeserializeOwned>(parameters: Value) -> crate::Result<T> {
    serde_path_to_error::deserialize(parameters).map_err(|e| {
        crate::AgentError::Validation(format!(
            "Parameter validation failed at {}: {}",
            e.path(),
            e
        ))
    })
}

/// Registry for available tools
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Generate tool schemas for OpenAI function calling, ordered by name
    pub fn to_openai_tools(&self) -> Vec<Value> {
        self.names()
            .into_iter()
            .filter_map(|name| self.get(name))
            .map(|tool| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema()
                    }
                })
            })
            .collect()
    }
}
