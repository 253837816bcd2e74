use std::sync::Arc;

use anyhow::Context;
use demise_bot::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_INGRESS_BIND, DEFAULT_INGRESS_PATH, DISCORD_DEFAULT_API_BASE,
    DemiseRuntimeConfig, DemiseSettings, DiscordPlatform, GuildId, HostPlatform,
    InteractionVerifier, UserId, WidgetStore, run_discord_ingress, run_recovery_scan,
};

use crate::cli::DiscordArgs;
use crate::resolve::{resolve_optional_string, resolve_positive_usize, resolve_string};

use super::common::{non_empty_string, parse_comma_separated_ids};

/// Pieces of runtime wiring shared by `run` and `scan`.
struct DiscordWiring {
    platform: DiscordPlatform,
    config: DemiseRuntimeConfig,
}

fn resolve_wiring(args: DiscordArgs, settings: &DemiseSettings) -> anyhow::Result<DiscordWiring> {
    let DiscordArgs {
        bot_token,
        allowed_guilds,
        api_base_url,
        history_limit,
        verbose: _,
    } = args;

    let token = bot_token
        .or_else(|| std::env::var("DISCORD_BOT_TOKEN").ok())
        .and_then(non_empty_string)
        .context("--bot-token or DISCORD_BOT_TOKEN required")?;
    let allowed_guilds = resolve_string(
        allowed_guilds,
        "DEMISE_DISCORD_ALLOWED_GUILDS",
        settings.discord.allowed_guilds.as_deref(),
        "",
    );
    let api_base_url = resolve_string(
        api_base_url,
        "DEMISE_DISCORD_API_BASE_URL",
        settings.discord.api_base_url.as_deref(),
        DISCORD_DEFAULT_API_BASE,
    );
    let history_limit = resolve_positive_usize(
        history_limit,
        "DEMISE_SELECTOR_HISTORY_LIMIT",
        settings.selectors.history_limit,
        DEFAULT_HISTORY_LIMIT,
    );

    let config = DemiseRuntimeConfig {
        allowed_guilds: parse_comma_separated_ids::<GuildId>("guild", &allowed_guilds),
        ..DemiseRuntimeConfig::default()
    }
    .with_history_limit(history_limit);
    Ok(DiscordWiring {
        platform: DiscordPlatform::new_with_base_url(token, api_base_url),
        config,
    })
}

pub(crate) async fn run_ingress_command(
    discord: DiscordArgs,
    admin_users: Option<String>,
    ingress_bind: Option<String>,
    ingress_path: Option<String>,
    public_key: Option<String>,
    ingress_secret_token: Option<String>,
    settings: &DemiseSettings,
) -> anyhow::Result<()> {
    let DiscordWiring { platform, config } = resolve_wiring(discord, settings)?;
    let admin_users = resolve_string(
        admin_users,
        "DEMISE_DISCORD_ADMIN_USERS",
        settings.discord.admin_users.as_deref(),
        "",
    );
    let bind_addr = resolve_string(
        ingress_bind,
        "DEMISE_DISCORD_INGRESS_BIND",
        settings.discord.ingress_bind.as_deref(),
        DEFAULT_INGRESS_BIND,
    );
    let ingress_path = resolve_string(
        ingress_path,
        "DEMISE_DISCORD_INGRESS_PATH",
        settings.discord.ingress_path.as_deref(),
        DEFAULT_INGRESS_PATH,
    );
    let secret_token = resolve_optional_string(
        ingress_secret_token,
        "DEMISE_DISCORD_INGRESS_SECRET_TOKEN",
        settings.discord.ingress_secret_token.as_deref(),
    )
    .and_then(non_empty_string);
    let public_key = resolve_optional_string(
        public_key,
        "DEMISE_DISCORD_PUBLIC_KEY",
        settings.discord.public_key.as_deref(),
    )
    .and_then(non_empty_string)
    .context("--public-key, DEMISE_DISCORD_PUBLIC_KEY or discord.public_key required")?;
    let verifier =
        InteractionVerifier::from_hex(&public_key).context("invalid Discord application public key")?;

    let admin_users = parse_comma_separated_ids::<UserId>("user", &admin_users);
    let platform: Arc<dyn HostPlatform> = Arc::new(platform.with_admin_users(admin_users));
    run_discord_ingress(
        platform,
        DemiseRuntimeConfig {
            bind_addr,
            ingress_path,
            verifier: Some(verifier),
            secret_token,
            ..config
        },
    )
    .await
}

pub(crate) async fn run_scan_command(
    discord: DiscordArgs,
    settings: &DemiseSettings,
) -> anyhow::Result<()> {
    let DiscordWiring { platform, config } = resolve_wiring(discord, settings)?;
    let platform: Arc<dyn HostPlatform> = Arc::new(platform);
    let store = Arc::new(WidgetStore::default());
    let report = run_recovery_scan(platform, Arc::clone(&store), &config).await?;
    let output = serde_json::json!({
        "report": report,
        "selectors": store.snapshot().await,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
