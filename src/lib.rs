pub mod cli;
pub mod config;
pub mod crews;
pub mod flow;
pub mod input;
pub mod llm;
pub mod logging;
pub mod outlet;

// Re-export commonly used types
pub use config::Config;
pub use flow::state::SourceInputs;
pub use flow::{FlowOutcome, FlowStatus, GuideFlow, launch};
