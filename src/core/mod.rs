pub mod agent;
pub mod memory;
pub mod steps;

pub use crate::types::result::{RunResult, TokenUsage};
pub use agent::{Agent, AGENT_DESCRIPTION, AGENT_NAME, DEFAULT_INSTRUCTION};
pub use memory::AgentMemory;
pub use steps::AgentStep;
