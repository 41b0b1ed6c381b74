//! Plain-text rendering of a [`LiveView`] for terminals and stadium screens.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::live_feed::LiveView;
use crate::config::CelebrationStyle;
use crate::domain::{EventKind, EventView, FixtureView, MatchStatus, Side};

const FEED_LENGTH: usize = 8;

/// Renders `view` at `now`.
#[must_use]
pub fn render(view: &LiveView, now: DateTime<Utc>, style: CelebrationStyle) -> String {
    let mut out = String::new();
    let Some(fixture) = &view.fixture else {
        let _ = writeln!(out, "Waiting for fixture {}…", view.match_id);
        return out;
    };
    if view.deleted {
        let _ = writeln!(out, "Fixture {} is no longer available.", view.match_id);
        return out;
    }

    let _ = writeln!(
        out,
        "{}  {} - {}  {}",
        fixture.side_name(Side::A),
        fixture.fixture.score_a,
        fixture.fixture.score_b,
        fixture.side_name(Side::B),
    );
    let _ = writeln!(out, "{}", status_line(view, now));
    if !view.connected {
        let _ = writeln!(out, "(connecting…)");
    }

    if let Some(goal) = &view.celebrating {
        out.push('\n');
        match style {
            CelebrationStyle::Stadium => stadium_overlay(&mut out, fixture, goal),
            CelebrationStyle::Inline => {
                let _ = writeln!(out, "GOAL! {}", goal_caption(fixture, goal));
            }
        }
    }

    if !view.events.is_empty() {
        out.push('\n');
        for event in view.events.iter().take(FEED_LENGTH) {
            let _ = writeln!(out, "{}", feed_line(fixture, event));
        }
    }
    out
}

fn status_line(view: &LiveView, now: DateTime<Utc>) -> String {
    let Some(fixture) = &view.fixture else {
        return String::new();
    };
    let row = &fixture.fixture;
    match row.status {
        MatchStatus::Upcoming => row.scheduled_at.map_or_else(
            || "Not started".to_string(),
            |at| format!("Kick-off {}", at.format("%Y-%m-%d %H:%M UTC")),
        ),
        MatchStatus::Completed => "Full time".to_string(),
        MatchStatus::Live => {
            let Some(clock) = view.clock(now) else {
                return String::new();
            };
            if row.is_half_time_break() {
                format!("Half time  {}", clock.formatted)
            } else if clock.running {
                format!("{}'  {}  H{}", clock.display_minute, clock.formatted, clock.half)
            } else {
                format!("{}'  {}  H{}  paused", clock.display_minute, clock.formatted, clock.half)
            }
        }
    }
}

fn goal_caption(fixture: &FixtureView, goal: &EventView) -> String {
    let scorer = goal.scorer.as_ref().map_or("Unknown", |p| p.name.as_str());
    let mut caption = format!(
        "{scorer} ({}) {}'",
        fixture.side_name(goal.event.side),
        goal.event.minute
    );
    if let Some(assist) = &goal.assist {
        let _ = write!(caption, ", assist {}", assist.name);
    }
    caption
}

fn stadium_overlay(out: &mut String, fixture: &FixtureView, goal: &EventView) {
    let caption = goal_caption(fixture, goal);
    let width = caption.chars().count().max(12) + 4;
    let border = "#".repeat(width);
    let _ = writeln!(out, "{border}");
    let _ = writeln!(out, "#{:^inner$}#", "G O A L", inner = width - 2);
    let _ = writeln!(out, "#{:^inner$}#", caption, inner = width - 2);
    let _ = writeln!(out, "{border}");
}

fn feed_line(fixture: &FixtureView, event: &EventView) -> String {
    let who = event.scorer.as_ref().map_or("", |p| p.name.as_str());
    let team = fixture.side_name(event.event.side);
    let label = match event.event.kind {
        EventKind::Goal => "Goal",
        EventKind::OwnGoal => "Own goal",
        EventKind::YellowCard => "Yellow card",
        EventKind::RedCard => "Red card",
        EventKind::Substitution => "Substitution",
    };
    format!("{:>3}'  {label:<12} {team:<16} {who}", event.event.minute)
        .trim_end()
        .to_string()
}
