//! fabric CLI integration.

pub mod params;
pub mod subprocess;

pub use params::{GenerationParameters, build_arguments, escape_argument};
pub use subprocess::{
    CommandRunner, FABRIC_COMMAND, ProcessResult, ProcessRunner, check_fabric_installed,
    is_fabric_configured, run_command,
};
