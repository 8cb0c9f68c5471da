mod cli;
mod project;
mod tools;

mod commands {
    pub mod build_cmd;
    pub mod check_cmd;
    pub mod init_cmd;
}

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::project::detect_site;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init { name } => commands::init_cmd::run(&name),
        Command::Check => commands::check_cmd::run(&detect_site()?),
        Command::Build { release } => commands::build_cmd::run(release, &detect_site()?).await,
    }
}
