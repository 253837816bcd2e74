use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "demise")]
#[command(about = "Discord bot: persistent role selectors and size roleplay commands.")]
pub(crate) struct Cli {
    /// Override config directory (settings are read from `<conf>/demise/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    pub(crate) fn verbose(&self) -> bool {
        match &self.command {
            Command::Run { discord, .. } | Command::Scan { discord } => discord.verbose,
        }
    }
}

/// Options shared by every command that talks to Discord.
#[derive(Debug, Clone, Args)]
pub(crate) struct DiscordArgs {
    /// Bot token (falls back to DISCORD_BOT_TOKEN).
    #[arg(long)]
    pub(crate) bot_token: Option<String>,

    /// Guild IDs to serve and scan (comma-separated). Empty = every guild the bot is in.
    #[arg(long)]
    pub(crate) allowed_guilds: Option<String>,

    /// Discord REST API base URL.
    #[arg(long)]
    pub(crate) api_base_url: Option<String>,

    /// Recent messages inspected per channel during recovery (default: 50, max: 1000).
    #[arg(long)]
    pub(crate) history_limit: Option<usize>,

    /// Debug-level logs for this crate.
    #[arg(long, short = 'v', default_value_t = false)]
    pub(crate) verbose: bool,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Recover role selectors, then serve the Discord interactions endpoint.
    Run {
        #[command(flatten)]
        discord: DiscordArgs,

        /// User IDs always allowed to manage role selectors (comma-separated).
        #[arg(long)]
        admin_users: Option<String>,

        /// Ingress listen address (default: 0.0.0.0:8082).
        #[arg(long)]
        ingress_bind: Option<String>,

        /// Ingress path (default: /discord/interactions).
        #[arg(long)]
        ingress_path: Option<String>,

        /// Application public key (hex) used to verify Discord's request signatures.
        #[arg(long)]
        public_key: Option<String>,

        /// Extra shared secret expected in the `x-demise-ingress-token` header.
        #[arg(long)]
        ingress_secret_token: Option<String>,
    },
    /// Run one recovery pass and print the report as JSON.
    Scan {
        #[command(flatten)]
        discord: DiscordArgs,
    },
}
