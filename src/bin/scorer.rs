//! Line-based admin scorer.
//!
//! Reads commands from stdin and applies them through the gateway with
//! optimistic updates. The clock line redraws every tick and the selected
//! fixture is re-fetched every poll interval. Type `help` for the command
//! list.

use std::io::Write;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use fixture_gateway::client::{AdminScorer, HttpGateway};
use fixture_gateway::config::FeedConfig;
use fixture_gateway::domain::{ClockReading, MatchId, PlayerId, ScoringCommand, Side};

const HELP: &str = "\
commands:
  select <match-id>          load a fixture
  refresh                    reload the selected fixture
  start | ht | 2h | end      lifecycle
  pause | resume | restart   clock control
  goal <a|b> [scorer] [assist] [own]
  score <a> <b>              override the score
  reset                      clear score, anchors and events
  show                       print the fixture
  quit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Select(MatchId),
    Refresh,
    Show,
    Help,
    Quit,
    Action(ScoringCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = FeedConfig::from_env().map_err(|e| anyhow!("invalid configuration: {e}"))?;
    let mut scorer = AdminScorer::new(Arc::new(HttpGateway::new(config.gateway_url.as_str())));
    if let Some(match_id) = config.match_id {
        report(scorer.select(match_id).await);
        show(&scorer);
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(config.tick_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut resync = tokio::time::interval(config.poll_interval);
    resync.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tick.tick() => {
                show_clock(&scorer)?;
                continue;
            }
            _ = resync.tick() => {
                if scorer.selected().is_some()
                    && let Err(e) = scorer.refresh().await
                {
                    tracing::warn!(error = %e, "scorer refresh failed");
                }
                continue;
            }
        };
        let Some(line) = line else { break };
        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {e}");
                continue;
            }
        };
        match input {
            Input::Select(match_id) => report(scorer.select(match_id).await),
            Input::Refresh => report(scorer.refresh().await),
            Input::Show => {}
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Quit => break,
            Input::Action(command) => report(scorer.act(command).await.map(|_| ())),
        }
        show(&scorer);
    }
    Ok(())
}

/// Rewrites the clock status line in place.
fn show_clock(scorer: &AdminScorer<HttpGateway>) -> std::io::Result<()> {
    let Some(clock) = scorer.clock(Utc::now()) else {
        return Ok(());
    };
    let mut stdout = std::io::stdout();
    write!(stdout, "\r\x1b[2K{} > ", clock_line(&clock))?;
    stdout.flush()
}

fn clock_line(clock: &ClockReading) -> String {
    let mut line = format!("{}' {} half {}", clock.display_minute, clock.formatted, clock.half);
    if !clock.running {
        line.push_str(" (stopped)");
    }
    line
}

fn report(result: Result<(), fixture_gateway::client::ClientError>) {
    if let Err(e) = result {
        println!("error: {e}");
    }
}

fn show(scorer: &AdminScorer<HttpGateway>) {
    let Some(view) = scorer.fixture() else {
        println!("no fixture selected");
        return;
    };
    let row = &view.fixture;
    println!(
        "{} {} - {} {}  [{}] v{}",
        view.side_name(Side::A),
        row.score_a,
        row.score_b,
        view.side_name(Side::B),
        row.status.as_str(),
        row.version,
    );
    if let Some(clock) = scorer.clock(Utc::now()) {
        println!("  {}", clock_line(&clock));
    }
    for event in scorer.events().iter().take(5) {
        let who = event.scorer.as_ref().map_or("-", |p| p.name.as_str());
        println!("  {}' {} {who}", event.event.minute, event.event.kind.as_str());
    }
}

fn parse_line(line: &str) -> anyhow::Result<Option<Input>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let input = match head {
        "select" => {
            let raw = args.first().ok_or_else(|| anyhow!("select needs a match id"))?;
            Input::Select(raw.parse()?)
        }
        "refresh" => Input::Refresh,
        "show" => Input::Show,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "start" => Input::Action(ScoringCommand::Start),
        "ht" => Input::Action(ScoringCommand::HalfTime),
        "2h" => Input::Action(ScoringCommand::StartSecondHalf),
        "end" => Input::Action(ScoringCommand::End),
        "pause" => Input::Action(ScoringCommand::Pause),
        "resume" => Input::Action(ScoringCommand::Resume),
        "restart" => Input::Action(ScoringCommand::RestartTimer),
        "reset" => Input::Action(ScoringCommand::Reset),
        "goal" => Input::Action(parse_goal(&args)?),
        "score" => match args.as_slice() {
            [a, b] => Input::Action(ScoringCommand::OverrideScore {
                score_a: a.parse()?,
                score_b: b.parse()?,
            }),
            _ => return Err(anyhow!("score needs two numbers")),
        },
        other => return Err(anyhow!("unknown command `{other}`, try `help`")),
    };
    Ok(Some(input))
}

fn parse_goal(args: &[&str]) -> anyhow::Result<ScoringCommand> {
    let (side, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("goal needs a side (a or b)"))?;
    let side = match side.to_ascii_lowercase().as_str() {
        "a" => Side::A,
        "b" => Side::B,
        other => return Err(anyhow!("unknown side `{other}`")),
    };
    let own_goal = rest.contains(&"own");
    let mut players = rest.iter().filter(|w| **w != "own");
    let scorer_id = players.next().map(|raw| raw.parse::<PlayerId>()).transpose()?;
    let assist_id = players.next().map(|raw| raw.parse::<PlayerId>()).transpose()?;
    Ok(ScoringCommand::RecordGoal {
        side,
        scorer_id,
        assist_id,
        own_goal,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use fixture_gateway::domain::{Fixture, TeamId};

    #[test]
    fn clock_line_advances_with_each_tick() {
        let kickoff = Utc::now();
        let mut fixture = Fixture::new(TeamId::new(), TeamId::new(), None, 20, kickoff);
        let Ok(()) = fixture.start(kickoff) else {
            panic!("start failed");
        };

        let first = clock_line(&ClockReading::at(&fixture, kickoff + TimeDelta::seconds(5)));
        let next = clock_line(&ClockReading::at(&fixture, kickoff + TimeDelta::seconds(6)));
        assert_eq!(first, "1' 00:05 half 1");
        assert_eq!(next, "1' 00:06 half 1");

        let Ok(()) = fixture.apply(&ScoringCommand::End, kickoff + TimeDelta::seconds(70)) else {
            panic!("end failed");
        };
        let ended = clock_line(&ClockReading::at(&fixture, kickoff + TimeDelta::seconds(300)));
        assert_eq!(ended, "2' 01:10 half 1 (stopped)");
    }

    #[test]
    fn parses_lifecycle_and_score() {
        assert!(matches!(parse_line("ht"), Ok(Some(Input::Action(ScoringCommand::HalfTime)))));
        assert!(matches!(parse_line("   "), Ok(None)));
        assert!(matches!(
            parse_line("score 2 1"),
            Ok(Some(Input::Action(ScoringCommand::OverrideScore { score_a: 2, score_b: 1 })))
        ));
        assert!(parse_line("score 2").is_err());
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn parses_goal_with_players() {
        let scorer = PlayerId::new();
        let Ok(Some(Input::Action(command))) = parse_line(&format!("goal B {scorer} own")) else {
            panic!("expected a goal");
        };
        assert_eq!(
            command,
            ScoringCommand::RecordGoal {
                side: Side::B,
                scorer_id: Some(scorer),
                assist_id: None,
                own_goal: true,
            }
        );
        assert!(parse_line("goal c").is_err());
    }
}
