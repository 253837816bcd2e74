//! demise CLI: serve the Discord interactions endpoint, or run one recovery scan.
//!
//! Logging: set `RUST_LOG=demise_bot=debug` (or `warn`, `info`) to see logs on stderr.

mod cli;
mod nodes;
mod resolve;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use demise_bot::{load_runtime_settings, set_config_home_override};

use crate::cli::{Cli, Command};
use crate::nodes::{run_ingress_command, run_scan_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose() {
            "demise_bot=debug,demise=debug"
        } else {
            "demise_bot=info,demise=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let runtime_settings = load_runtime_settings();

    match cli.command {
        Command::Run {
            discord,
            admin_users,
            ingress_bind,
            ingress_path,
            public_key,
            ingress_secret_token,
        } => {
            run_ingress_command(
                discord,
                admin_users,
                ingress_bind,
                ingress_path,
                public_key,
                ingress_secret_token,
                &runtime_settings,
            )
            .await
        }
        Command::Scan { discord } => run_scan_command(discord, &runtime_settings).await,
    }
}
