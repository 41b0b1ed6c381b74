//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::{PgExecutor, PgPoolOptions};
use uuid::Uuid;

use super::models::{EventRow, FixtureRow, PlayerRow, TeamRow, side_column};
use crate::config::GatewayConfig;
use crate::domain::{ChangeNotification, Fixture, MatchEvent, MatchId, Player, Team};
use crate::error::GatewayError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

/// Everything needed to rebuild the in-memory state at startup.
#[derive(Debug, Default)]
pub struct RestoredState {
    /// All teams.
    pub teams: Vec<Team>,
    /// All players.
    pub players: Vec<Player>,
    /// All fixtures.
    pub fixtures: Vec<Fixture>,
    /// All events of all fixtures.
    pub events: Vec<MatchEvent>,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool using the database settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database cannot
    /// be reached.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations from `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }

    /// Inserts or replaces a team.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn upsert_team(&self, team: &Team) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO teams (id, name, short_name, logo_url, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, \
             short_name = EXCLUDED.short_name, logo_url = EXCLUDED.logo_url",
        )
        .bind(Uuid::from(team.id))
        .bind(&team.name)
        .bind(&team.short_name)
        .bind(&team.logo_url)
        .bind(team.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or replaces a player.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn upsert_player(&self, player: &Player) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO players (id, team_id, name, shirt_number) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET team_id = EXCLUDED.team_id, \
             name = EXCLUDED.name, shirt_number = EXCLUDED.shirt_number",
        )
        .bind(Uuid::from(player.id))
        .bind(Uuid::from(player.team_id))
        .bind(&player.name)
        .bind(player.shirt_number.map(i32::from))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or replaces a fixture row.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn upsert_fixture(&self, fixture: &Fixture) -> Result<(), GatewayError> {
        write_fixture(&self.pool, fixture).await
    }

    /// Writes the score update and the event insert of a goal in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure;
    /// neither write is applied in that case.
    pub async fn record_goal(
        &self,
        fixture: &Fixture,
        event: &MatchEvent,
    ) -> Result<(), GatewayError> {
        let mut tx = self.pool.begin().await?;
        write_fixture(&mut *tx, fixture).await?;
        write_event(&mut *tx, event).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Writes a reset fixture row and deletes its events in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn reset_fixture(&self, fixture: &Fixture) -> Result<u64, GatewayError> {
        let mut tx = self.pool.begin().await?;
        write_fixture(&mut *tx, fixture).await?;
        let deleted = sqlx::query("DELETE FROM events WHERE match_id = $1")
            .bind(Uuid::from(fixture.id))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted)
    }

    /// Deletes a fixture; its events cascade.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_fixture(&self, match_id: MatchId) -> Result<(), GatewayError> {
        sqlx::query("DELETE FROM fixtures WHERE id = $1")
            .bind(Uuid::from(match_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Loads every team, player, fixture and event.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// if a stored row is malformed.
    pub async fn load_all(&self) -> Result<RestoredState, GatewayError> {
        let teams = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, short_name, logo_url, created_at FROM teams",
        )
        .fetch_all(&self.pool)
        .await?;

        let players = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, team_id, name, shirt_number FROM players",
        )
        .fetch_all(&self.pool)
        .await?;

        let fixtures = sqlx::query_as::<_, FixtureRow>(
            "SELECT id, side_a, side_b, status, score_a, score_b, scheduled_at, started_at, \
             half_time_at, second_half_started_at, ended_at, paused_seconds, paused_at, \
             current_half, half_length_minutes, version, created_at, updated_at FROM fixtures",
        )
        .fetch_all(&self.pool)
        .await?;

        let events = sqlx::query_as::<_, EventRow>(
            "SELECT id, match_id, kind, side, scorer_id, assist_id, minute, half, sequence, \
             recorded_at FROM events ORDER BY match_id, sequence",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(RestoredState {
            teams: teams.into_iter().map(Team::from).collect(),
            players: players.into_iter().map(Player::from).collect(),
            fixtures: fixtures
                .into_iter()
                .map(Fixture::try_from)
                .collect::<Result<_, _>>()?,
            events: events
                .into_iter()
                .map(MatchEvent::try_from)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Appends a change notification to the change log.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn append_change(&self, change: &ChangeNotification) -> Result<i64, GatewayError> {
        let payload = serde_json::to_value(change)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO change_log (match_id, event_type, version, payload) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(Uuid::from(change.match_id))
        .bind(change.event_type_str())
        .bind(i64::try_from(change.version).unwrap_or(i64::MAX))
        .bind(&payload)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Deletes change-log rows older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_old_changes(&self, before_days: u64) -> Result<u64, GatewayError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM change_log WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

async fn write_fixture<'e, E>(executor: E, fixture: &Fixture) -> Result<(), GatewayError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO fixtures (id, side_a, side_b, status, score_a, score_b, scheduled_at, \
         started_at, half_time_at, second_half_started_at, ended_at, paused_seconds, paused_at, \
         current_half, half_length_minutes, version, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status, score_a = EXCLUDED.score_a, \
         score_b = EXCLUDED.score_b, scheduled_at = EXCLUDED.scheduled_at, \
         started_at = EXCLUDED.started_at, half_time_at = EXCLUDED.half_time_at, \
         second_half_started_at = EXCLUDED.second_half_started_at, ended_at = EXCLUDED.ended_at, \
         paused_seconds = EXCLUDED.paused_seconds, paused_at = EXCLUDED.paused_at, \
         current_half = EXCLUDED.current_half, half_length_minutes = EXCLUDED.half_length_minutes, \
         version = EXCLUDED.version, updated_at = EXCLUDED.updated_at \
         WHERE fixtures.version <= EXCLUDED.version",
    )
    .bind(Uuid::from(fixture.id))
    .bind(Uuid::from(fixture.side_a))
    .bind(Uuid::from(fixture.side_b))
    .bind(fixture.status.as_str())
    .bind(i32::try_from(fixture.score_a).unwrap_or(i32::MAX))
    .bind(i32::try_from(fixture.score_b).unwrap_or(i32::MAX))
    .bind(fixture.scheduled_at)
    .bind(fixture.started_at)
    .bind(fixture.half_time_at)
    .bind(fixture.second_half_started_at)
    .bind(fixture.ended_at)
    .bind(i64::try_from(fixture.paused_seconds).unwrap_or(i64::MAX))
    .bind(fixture.paused_at)
    .bind(i16::from(fixture.current_half.number()))
    .bind(i32::try_from(fixture.half_length_minutes).unwrap_or(i32::MAX))
    .bind(i64::try_from(fixture.version).unwrap_or(i64::MAX))
    .bind(fixture.created_at)
    .bind(fixture.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

async fn write_event<'e, E>(executor: E, event: &MatchEvent) -> Result<(), GatewayError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO events (id, match_id, kind, side, scorer_id, assist_id, minute, half, \
         sequence, recorded_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(Uuid::from(event.id))
    .bind(Uuid::from(event.match_id))
    .bind(event.kind.as_str())
    .bind(side_column(event.side))
    .bind(event.scorer_id.map(Uuid::from))
    .bind(event.assist_id.map(Uuid::from))
    .bind(i32::try_from(event.minute).unwrap_or(i32::MAX))
    .bind(i16::from(event.half.number()))
    .bind(i64::try_from(event.sequence).unwrap_or(i64::MAX))
    .bind(event.recorded_at)
    .execute(executor)
    .await?;
    Ok(())
}
