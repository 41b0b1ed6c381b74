//! Terminal scoreboard following one fixture through the gateway.
//!
//! Re-renders every tick and on every feed change. Configure with
//! `GATEWAY_URL`, `MATCH_ID` and `CELEBRATION_STYLE` (see `FeedConfig`).

use std::io::Write as _;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use fixture_gateway::client::{FeedOptions, HttpGateway, LiveFeed, WsChangeSource, scoreboard};
use fixture_gateway::config::FeedConfig;
use fixture_gateway::domain::{MatchId, MatchStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not fight with the screen.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = FeedConfig::from_env().map_err(|e| anyhow!("invalid configuration: {e}"))?;
    let gateway = Arc::new(HttpGateway::new(config.gateway_url.as_str()));

    let match_id = match config.match_id {
        Some(id) => id,
        None => pick_fixture(&gateway).await?,
    };

    let changes = Arc::new(WsChangeSource::new(config.ws_url.as_str()));
    let feed = LiveFeed::start(gateway, changes, match_id, FeedOptions::from(&config));
    let mut updates = feed.subscribe();

    let mut tick = tokio::time::interval(config.tick_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            _ = tick.tick() => {}
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
        let view = updates.borrow_and_update().clone();
        let screen = scoreboard::render(&view, Utc::now(), config.celebration);
        write!(stdout, "\x1b[2J\x1b[H{screen}")?;
        stdout.flush()?;
    }

    feed.stop();
    Ok(())
}

/// First live fixture, else the first upcoming one.
async fn pick_fixture(gateway: &HttpGateway) -> anyhow::Result<MatchId> {
    for status in [MatchStatus::Live, MatchStatus::Upcoming] {
        let fixtures = gateway
            .list_fixtures(Some(status))
            .await
            .context("listing fixtures")?;
        if let Some(first) = fixtures.first() {
            return Ok(first.id);
        }
    }
    Err(anyhow!("no live or upcoming fixture; set MATCH_ID"))
}
