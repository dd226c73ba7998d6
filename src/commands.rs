//! Subcommand implementations.

use std::sync::Arc;

use tracing::{error, info, warn};

use movesync_config::{Config, ConfigLoader, ConfigValidator};
use movesync_core::{BotController, BotOptions, EngineClient};
use movesync_host_cdp::CdpHost;
use movesync_protocols::BotState;

/// Validate the configuration, logging warnings and failing on errors.
fn validate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let warnings = ConfigValidator::validate(config).into_result()?;
    for warning in warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    Ok(())
}

/// Attach to the browser tab, start the bot and log status transitions
/// until Ctrl-C.
pub(crate) async fn run_bot(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    validate(&config)?;
    info!("Starting movesync v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Browser: {} (tab matching '{}')",
        config.browser.endpoint, config.browser.page_url_pattern
    );
    info!("Engine: {}", config.engine.endpoint);

    let host = CdpHost::attach(&config.browser, config.selectors.clone()).await?;
    let engine = EngineClient::from_config(&config.engine);
    let bot = BotController::new(
        Arc::new(host),
        Arc::new(engine),
        BotOptions::from_config(&config),
    );

    let mut status = bot.subscribe_status();
    let reporter = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            match (current.status, current.last_error) {
                (BotState::Error, Some(message)) => error!("Bot status: error ({})", message),
                (state, _) => info!("Bot status: {}", state),
            }
        }
    });

    bot.start().await;

    tokio::signal::ctrl_c().await?;
    info!("Interrupted, stopping bot");
    bot.stop().await;
    reporter.abort();
    Ok(())
}

/// Run the recommendation service until Ctrl-C.
pub(crate) async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    validate(&config)?;
    info!("Starting movesync service v{}", env!("CARGO_PKG_VERSION"));

    movesync_engine_service::run(&config.service, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
        info!("Shutting down");
    })
    .await?;
    Ok(())
}

/// Print the effective configuration after validation.
pub(crate) fn show_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    println!("{}", ConfigLoader::to_toml(config)?);
    result.into_result()?;
    Ok(())
}
