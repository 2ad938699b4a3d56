pub mod agents;
pub mod audit;
pub mod compaction;
pub mod config;
pub mod errors;
pub mod gemini;
pub mod memory;
pub mod orchestrator;
pub mod runtime;
pub mod tools;
pub mod ui;
pub mod util;
