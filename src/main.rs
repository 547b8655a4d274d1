use std::sync::Arc;

use hydrafit::bot::{Bot, BotDeps};
use hydrafit::channels::{ChannelManager, CliChannel, TelegramChannel};
use hydrafit::config::{BotConfig, TelegramConfig};
use hydrafit::error::Result;
use hydrafit::lookup::HttpLookup;
use hydrafit::tracker::UserRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    eprintln!("💧 hydrafit v{}", env!("CARGO_PKG_VERSION"));
    if config.weather.api_key.is_none() {
        eprintln!("   Warning: OPENWEATHERMAP_API_KEY not set, /set_profile cannot finish");
        eprintln!("     export OPENWEATHERMAP_API_KEY=...");
    }
    eprintln!("   Type /help and press Enter.\n");

    let lookup = HttpLookup::from_config(&config)?;
    let deps = BotDeps {
        registry: Arc::new(UserRegistry::new()),
        lookup: Arc::new(lookup),
    };

    // ── Channels ────────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();
    channels.add(Box::new(CliChannel::new()));

    if let Some(telegram_config) = TelegramConfig::from_env() {
        eprintln!("   Telegram: enabled");
        channels.add(Box::new(TelegramChannel::new(telegram_config)));
    }

    let bot = Bot::new(config, deps);
    bot.run(channels).await?;

    Ok(())
}
