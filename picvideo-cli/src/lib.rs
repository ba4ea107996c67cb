// picvideo-cli/src/lib.rs
//
// Library portion of the PicVideo CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, CreateArgs, PreviewArgs, ToolArgs};
pub use commands::check::run_check;
pub use commands::create::run_create;
pub use commands::preview::run_preview;
