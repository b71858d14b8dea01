//! Tools module containing tool abstractions and built-in tools

pub mod current_time;
pub mod function_factory;
pub mod tool;
pub mod weather;

pub use current_time::{CurrentTimeParams, CurrentTimeTool};
pub use function_factory::FunctionFactory;
pub use tool::{Tool, ToolFuture, ToolRegistry};
pub use weather::{lookup_weather, WeatherParams, WeatherReport, WeatherTool};
