use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rfcli",
    about = "Roomfolio site CLI",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scaffold a new site
    Init {
        /// Site name (directory to create)
        name: String,
    },
    /// Validate the site's assets against site.toml
    Check,
    /// Build the wasm bundle into <site>/pkg
    Build {
        /// Optimized build instead of a dev build
        #[arg(long)]
        release: bool,
    },
}
