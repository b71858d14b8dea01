//! weather-time-agent: a tool-calling agent that answers weather and local-time
//! questions.
//!
//! The interesting part is [`timezone::TimezoneResolver`], which maps a city
//! name or IANA identifier to a time zone. The agent exposes it to the model as
//! the `get_current_time` tool next to a stubbed `get_weather` tool.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use weather_time_agent::Agent;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads LITELLM_MODEL_API_BASE / _API_KEY / _MODEL_NAME (and .env)
//!     let agent = Agent::from_env()?;
//!
//!     let response = agent.run("What time is it in Taipei?").await?;
//!     println!("{}", response);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub(crate) mod services;
pub mod timezone;
pub mod tools;
pub mod types;

pub use config::ModelConfig;
pub use crate::core::{Agent, AgentMemory, AgentStep, RunResult, TokenUsage};
pub use error::{AgentError, Result};
pub use timezone::{Resolution, ResolveError, TimezoneResolver};
pub use tools::{FunctionFactory, Tool};

#[cfg(feature = "cli")]
pub mod cli;
