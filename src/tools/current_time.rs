use super::{
    tool::{parameters_schema_for, ToolFuture},
    Tool,
};
use crate::timezone::{ResolveError, Resolution, TimezoneResolver};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for local-time queries
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CurrentTimeParams {
    /// City name (e.g. "Taipei", "New York") or IANA time zone (e.g. "Asia/Taipei")
    pub city: String,
}

/// Reports the current time for a city or IANA time zone
#[derive(Debug, Clone)]
pub struct CurrentTimeTool {
    resolver: TimezoneResolver,
}

impl Default for CurrentTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrentTimeTool {
    /// Tool over the host tz database and wall clock
    pub fn new() -> Self {
        Self::with_resolver(TimezoneResolver::system())
    }

    pub fn with_resolver(resolver: TimezoneResolver) -> Self {
        Self { resolver }
    }

    /// Resolve the `city` argument; malformed arguments are an input failure,
    /// not a tool error.
    pub fn resolve(&self, parameters: serde_json::Value) -> Resolution {
        let parsed: Result<CurrentTimeParams, _> = serde_path_to_error::deserialize(parameters);
        match parsed {
            Ok(params) => self.resolver.resolve_time(&params.city),
            Err(err) => {
                debug!(target: "weather_time_agent::tools", path = %err.path(), error = %err, "Rejected get_current_time arguments");
                ResolveError::InvalidInput.into()
            }
        }
    }
}

impl Tool for CurrentTimeTool {
    fn name(&self) -> &'static str {
        "get_current_time"
    }

    fn description(&self) -> &'static str {
        "Returns the current time for a city or IANA timezone. Accepts an IANA name such as 'Asia/Taipei' or a city name such as 'Taipei'. When several time zones match, returns a list of candidates to choose from."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        parameters_schema_for::<CurrentTimeParams>()
    }

    fn execute(&self, parameters: serde_json::Value) -> ToolFuture<'_> {
        Box::pin(async move { Ok(self.resolve(parameters).to_payload()) })
    }
}
