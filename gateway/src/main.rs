use clap::Parser;
use thiserror::Error;

mod cli;
mod config;
mod handler;
mod http;
mod tracing;

use ::tracing::info;
use config::Config;
use http::{ApiServer, ServerError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ServerError(#[from] ServerError),
}

#[actix_web::main]
async fn main() -> Result<(), CliError> {
    dotenv::dotenv().ok();

    let cli = cli::Cli::parse();

    match cli.command.unwrap_or(cli::Commands::Serve) {
        cli::Commands::Serve => {
            tracing::init_tracing();

            let config = Config::load(&cli.config);
            info!(model = %config.generation.model(), "starting reply gate");
            for (name, settings) in config.guards.enabled() {
                info!(guard = name, model = %settings.model, "guard enabled");
            }

            let api_server = ApiServer::new(config);
            api_server.start().await?;
            Ok(())
        }
    }
}
