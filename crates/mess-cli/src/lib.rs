mod args;
mod commands;
pub mod console;
mod handlers;
pub mod presenters;
pub mod types;

pub use args::{Cli, Commands, ConfigCommand};
pub use commands::run;
