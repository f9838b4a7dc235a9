use super::args::{Cli, Commands, ConfigCommand};
use super::handlers;
use crate::presenters::Presenter;
use crate::types::LogLevel;
use anyhow::Result;
use mess_runtime::config::resolve_config_path;
use mess_runtime::{Config, DataAccess, HttpDataAccess};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_env("MESS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mess={0},mess_runtime={0}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);
    let presenter = Presenter::new(cli.format);

    match cli.command {
        Commands::Inspect {
            schemas,
            model,
            show_hidden,
        } => handlers::inspect::handle(&schemas, model.as_deref(), show_hidden, &presenter),

        Commands::Config { command } => {
            let path = resolve_config_path(cli.config.as_deref())?;
            let config = Config::load_from(&path)?.with_base_url(cli.url);

            match command {
                ConfigCommand::Show => handlers::config::show(&path, &config, &presenter),
                ConfigCommand::Save => handlers::config::save(&path, &config, &presenter),
            }
        }

        command => {
            let config = Config::load(cli.config.as_deref())?.with_base_url(cli.url);
            debug!(base_url = %config.base_url, "using backend");
            let access: Arc<dyn DataAccess> = Arc::new(HttpDataAccess::from_config(&config)?);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(dispatch(command, access, &config, &presenter))
        }
    }
}

async fn dispatch(
    command: Commands,
    access: Arc<dyn DataAccess>,
    config: &Config,
    presenter: &Presenter,
) -> Result<()> {
    match command {
        Commands::Info => handlers::catalog::info(access.as_ref(), config, presenter).await,
        Commands::Columns { model } => {
            handlers::catalog::columns(access.as_ref(), &model, presenter).await
        }
        Commands::Fields { model, show_hidden } => {
            handlers::catalog::fields(access.as_ref(), &model, show_hidden, presenter).await
        }
        Commands::List { model } => handlers::records::list(access, &model, presenter).await,
        Commands::Options { model, field } => {
            handlers::records::options(access, &model, &field, presenter).await
        }
        Commands::Create { model, assignments } => {
            handlers::records::create(access, &model, assignments, presenter).await
        }
        Commands::Update {
            model,
            id,
            assignments,
        } => handlers::records::update(access, &model, &id, assignments, presenter).await,
        Commands::Delete { model, id, yes } => {
            handlers::records::delete(access, &model, &id, yes, presenter).await
        }
        Commands::Inspect { .. } | Commands::Config { .. } => Ok(()),
    }
}
