use clap::Subcommand;

use crate::Result;

pub(crate) mod config;

#[derive(Subcommand, Default)]
pub(crate) enum Command {
    /// Run the web server (default)
    #[default]
    Serve,
    /// Print the configuration resolved from the environment
    Config,
}

impl Command {
    pub(crate) async fn run(&self) -> Result<()> {
        match &self {
            Command::Serve => crate::http_server::cmd::serve().await,
            Command::Config => config::print_config(),
        }
    }
}
