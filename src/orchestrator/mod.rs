//! The six-stage blog pipeline: prompt construction, agent invocation and
//! stage sequencing.

pub mod invoker;
pub mod pipeline;
pub mod prompts;
pub mod stage;

pub use invoker::{AgentInvoker, Invocation};
pub use pipeline::{
    CompactionLimits, NoopObserver, PipelineObserver, PipelineOrchestrator, PipelineReport,
};
pub use stage::{RunContext, Stage, StageResult};
