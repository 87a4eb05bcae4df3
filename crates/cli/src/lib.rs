// leadmerge CLI library
// The binary in main.rs is a thin argument layer over these modules.

pub mod backend;
pub mod exit_codes;
pub mod mode;
pub mod pipeline;
pub mod probe;
pub mod verify;

pub use mode::{resolve_mode, ModeDecision, ResolvedMode};
pub use pipeline::{run, run_with, PipelineError, RunReport, RunStatus};
