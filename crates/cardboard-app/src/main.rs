mod boot;
mod cli;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use cardboard_bridge::{BridgeCommand, BridgeResponse};
use cardboard_common::errors::ErrorReport;
use cardboard_telemetry::install_panic_hook;

// Headless demo page size. A real frontend would report its own.
const PAGE_WIDTH: f64 = 1280.0;
const PAGE_HEIGHT: f64 = 800.0;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("cardboard=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "cardboard=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("Cardboard v{} starting...", env!("CARGO_PKG_VERSION"));

    if args.list_cards {
        for card in cardboard_cards::registry() {
            println!("{:<16} {} — {}", card.id, card.icon, card.title);
        }
        return;
    }

    let config = match &args.config {
        Some(path) => cardboard_config::toml_loader::load_from_path(std::path::Path::new(path)),
        None => cardboard_config::load_config(),
    }
    .unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        cardboard_config::CardboardConfig::default()
    });

    let mut ctx = boot::AppContext::new(&config);
    install_panic_hook(ctx.reporter.clone());

    ctx.logger.info(
        "application started",
        json!({ "cards": cardboard_cards::registry().len() }),
    );

    // Confirm the backend is reachable before opening anything.
    match ctx.bridge.call(BridgeCommand::Ping).await {
        Ok(BridgeResponse::Pong) => tracing::info!("Bridge ready"),
        Ok(other) => tracing::warn!("Unexpected ping response: {other:?}"),
        Err(e) => {
            let err = cardboard_common::CardboardError::from(e);
            ctx.reporter.report_error(&err);
        }
    }

    let viewport = ctx.panels.viewport(PAGE_WIDTH, PAGE_HEIGHT);

    let to_open = config.cards.auto_open.iter().chain(args.open.iter());
    for id in to_open {
        match cardboard_cards::find(id) {
            Some(card) => {
                if let Err(e) = ctx.coordinator.open_card(card, viewport) {
                    let err = cardboard_common::CardboardError::from(e);
                    ctx.reporter.report_error(&err);
                }
            }
            None => {
                ctx.reporter
                    .report(ErrorReport::not_found(format!("unknown card id: {id}")));
            }
        }
    }

    tracing::info!(
        windows = ctx.coordinator.window_count(),
        events = ctx.bus.history(None, None).len(),
        "Startup complete"
    );

    if let Some(report) = ctx.reporter.active() {
        tracing::warn!("Active error: {}", report.to_user_message());
    }

    // Windows opened under the initial layout; reflow them if a panel
    // toggle happened during startup.
    if ctx.panels.transition_ended() {
        ctx.coordinator
            .reflow(ctx.panels.viewport(PAGE_WIDTH, PAGE_HEIGHT));
    }

    ctx.coordinator.close_all();
    ctx.logger.info("application shutting down", json!({}));
    tracing::info!("Shutdown complete");
}
