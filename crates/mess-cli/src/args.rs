use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mess")]
#[command(about = "Admin console for mongoose-style model APIs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to MESS_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Backend base URL, overriding the config file
    #[arg(long, env = "MESS_URL", global = true)]
    pub url: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the application title and the models the backend serves")]
    Info,

    #[command(about = "Show the grid columns derived from a model's schema")]
    Columns { model: String },

    #[command(about = "Show the editor fields derived from a model's schema")]
    Fields {
        model: String,

        /// Include internal fields (names starting with '_')
        #[arg(long)]
        show_hidden: bool,
    },

    #[command(about = "List a model's records")]
    List { model: String },

    #[command(about = "List the records a reference field can point at")]
    Options { model: String, field: String },

    #[command(about = "Create a record")]
    Create {
        model: String,

        /// Field assignment, e.g. --set name=Ada (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },

    #[command(about = "Update an existing record")]
    Update {
        model: String,
        id: String,

        /// Field assignment, e.g. --set admin=true (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },

    #[command(about = "Remove a record")]
    Delete {
        model: String,
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    #[command(about = "Project a schema file offline, without a backend")]
    Inspect {
        /// JSON file in the `api/schemas` wire format
        schemas: PathBuf,

        /// Model to project; lists all models when omitted
        model: Option<String>,

        #[arg(long)]
        show_hidden: bool,
    },

    #[command(about = "Inspect or write the config file")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the effective configuration and where it was read from")]
    Show,

    #[command(about = "Write the effective configuration to the config file")]
    Save,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{}'", raw)),
    }
}
