//! Dojang CLI

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use dojang_cli::backend::submission_service;
use dojang_cli::cli::{Args, Command, ConfigAction};
use dojang_cli::{commands, config_handlers, DojangConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dojang=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config_path = args.config.as_deref();

    match args.command {
        Command::Submit { file, chart } => {
            let config = DojangConfig::load(config_path)?;
            let service = submission_service(&config)?;
            let outcome = commands::cmd_submit(&service, &file, chart.as_deref()).await?;
            println!("{}", commands::format_outcome(&outcome));
        }
        Command::Form { template } => {
            println!("{}", commands::cmd_form(template)?);
        }
        Command::History { limit, width } => {
            let config = DojangConfig::load(config_path)?;
            let history = commands::cmd_history(&config, limit).await?;
            println!("{}", history.render(width));
        }
        Command::Serve { host, port } => {
            let mut config = DojangConfig::load(config_path)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            commands::cmd_serve(&config).await?;
        }
        Command::Config { action } => match action {
            ConfigAction::Path => {
                let (path, exists) = config_handlers::cmd_config_path(config_path)?;
                println!("{}", path.display());
                if !exists {
                    eprintln!("(file does not exist; run `dojang config init` to create it)");
                }
            }
            ConfigAction::Init { force } => {
                let path = config_handlers::cmd_config_init(config_path, force)?;
                println!("Config file created at {}", path.display());
            }
            ConfigAction::Show => {
                print!("{}", config_handlers::cmd_config_show(config_path)?);
            }
        },
    }

    Ok(())
}
