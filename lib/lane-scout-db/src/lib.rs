use sqlx::sqlite::SqliteQueryResult;
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::collections::HashSet;

// Re-export so that clients can avoid having sqlx as a dependency
pub use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod error;
pub mod model;

pub use error::Error;

const MATCH_COLUMNS: &str = "match_id, puuid, champion_id, champion_name, lane, role, win, kills, deaths,
    assists, kda, total_damage_dealt, total_damage_dealt_to_champions, gold_earned, cs, cs_per_minute,
    vision_score, game_duration, game_creation, patch, tier, rank, raw_data";

const AGGREGATE_COLUMNS: &str = "puuid, champion_id, champion_name, NULLIF(scope, '') AS scope,
    games_played, wins, win_rate, avg_kda, avg_cs_per_minute, avg_damage_share, avg_vision_score,
    is_comfort_pick, matchup_win_rates";

const SYNC_STATUS_COLUMNS: &str = "user_id, puuid, state, total_matches_synced,
    last_sync_added_count, last_synced_at, latest_match_id, last_error";

/// Counters written when a sync run finishes successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncCompletion {
    pub total_matches_synced: i64,
    pub last_sync_added_count: i64,
    pub latest_match_id: Option<String>,
    pub synced_at: DateTime<Utc>,
}

/// Wrapper around common database operations - by using this wrapper, clients
/// of [`DbHandler`] can remain database agnostic.
#[derive(Debug)]
pub struct DbHandler {
    pool: Pool<Sqlite>,
}

impl DbHandler {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), error::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a user from the database given the user ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<model::User>, error::Error> {
        let user = sqlx::query_as::<_, model::User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get every active user with a linked Riot account.
    pub async fn get_active_linked_users(&self) -> Result<Vec<model::User>, error::Error> {
        let users = sqlx::query_as::<_, model::User>(
            "SELECT * FROM users
            WHERE is_active = 1 AND riot_puuid IS NOT NULL AND riot_platform IS NOT NULL
            ORDER BY create_time, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Insert or replace user data. Account linking lives outside this crate; this is
    /// how that service (and test setups) seed the table.
    pub async fn upsert_user(&self, user: &model::User) -> Result<SqliteQueryResult, error::Error> {
        let result = sqlx::query(
            "INSERT INTO users (id, riot_puuid, riot_summoner_name, riot_platform, is_active, create_time)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                riot_puuid = excluded.riot_puuid,
                riot_summoner_name = excluded.riot_summoner_name,
                riot_platform = excluded.riot_platform,
                is_active = excluded.is_active",
        )
        .bind(&user.id)
        .bind(&user.riot_puuid)
        .bind(&user.riot_summoner_name)
        .bind(&user.riot_platform)
        .bind(user.is_active)
        .bind(user.create_time)
        .execute(&self.pool)
        .await?;
        Ok(result)
    }

    /// Of the provided match IDs, return those already stored for the PUUID.
    pub async fn get_stored_match_ids(
        &self,
        puuid: &str,
        match_ids: &[String],
    ) -> Result<HashSet<String>, error::Error> {
        if match_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT match_id FROM matches WHERE puuid = ");
        builder.push_bind(puuid);
        builder.push(" AND match_id IN (");
        let mut separated = builder.separated(", ");
        for match_id in match_ids {
            separated.push_bind(match_id.as_str());
        }
        separated.push_unseparated(")");

        let stored: Vec<String> = builder
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?;
        Ok(stored.into_iter().collect())
    }

    /// Insert a match record. A uniqueness violation is reported as
    /// [`error::Error::DuplicateMatch`] so callers can treat it as "already present".
    pub async fn insert_match(&self, record: &model::MatchRecord) -> Result<(), error::Error> {
        let result = sqlx::query(
            "INSERT INTO matches (match_id, puuid, champion_id, champion_name, lane, role, win, kills,
                deaths, assists, kda, total_damage_dealt, total_damage_dealt_to_champions, gold_earned,
                cs, cs_per_minute, vision_score, game_duration, game_creation, patch, tier, rank, raw_data)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.match_id)
        .bind(&record.puuid)
        .bind(record.champion_id)
        .bind(&record.champion_name)
        .bind(&record.lane)
        .bind(&record.role)
        .bind(record.win)
        .bind(record.kills)
        .bind(record.deaths)
        .bind(record.assists)
        .bind(record.kda)
        .bind(record.total_damage_dealt)
        .bind(record.total_damage_dealt_to_champions)
        .bind(record.gold_earned)
        .bind(record.cs)
        .bind(record.cs_per_minute)
        .bind(record.vision_score)
        .bind(record.game_duration)
        .bind(record.game_creation)
        .bind(&record.patch)
        .bind(&record.tier)
        .bind(&record.rank)
        .bind(&record.raw_data)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(error::Error::DuplicateMatch(record.match_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get every stored match of a PUUID, oldest first.
    pub async fn get_matches(&self, puuid: &str) -> Result<Vec<model::MatchRecord>, error::Error> {
        let query = format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE puuid = ? ORDER BY game_creation ASC, match_id ASC"
        );
        let matches = sqlx::query_as::<_, model::MatchRecord>(&query)
            .bind(puuid)
            .fetch_all(&self.pool)
            .await?;
        Ok(matches)
    }

    /// Get the most recent `limit` matches of a PUUID, newest first.
    pub async fn get_recent_matches(
        &self,
        puuid: &str,
        limit: i64,
    ) -> Result<Vec<model::MatchRecord>, error::Error> {
        let query = format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE puuid = ?
            ORDER BY game_creation DESC, match_id DESC LIMIT ?"
        );
        let matches = sqlx::query_as::<_, model::MatchRecord>(&query)
            .bind(puuid)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(matches)
    }

    /// Get the first `limit` matches of a PUUID, oldest first.
    pub async fn get_earliest_matches(
        &self,
        puuid: &str,
        limit: i64,
    ) -> Result<Vec<model::MatchRecord>, error::Error> {
        let query = format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE puuid = ?
            ORDER BY game_creation ASC, match_id ASC LIMIT ?"
        );
        let matches = sqlx::query_as::<_, model::MatchRecord>(&query)
            .bind(puuid)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(matches)
    }

    /// Get every stored match of a PUUID on one champion, newest first.
    pub async fn get_champion_matches(
        &self,
        puuid: &str,
        champion_name: &str,
    ) -> Result<Vec<model::MatchRecord>, error::Error> {
        let query = format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE puuid = ? AND champion_name = ?
            ORDER BY game_creation DESC"
        );
        let matches = sqlx::query_as::<_, model::MatchRecord>(&query)
            .bind(puuid)
            .bind(champion_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(matches)
    }

    pub async fn count_matches(&self, puuid: &str) -> Result<i64, error::Error> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM matches WHERE puuid = ?")
            .bind(puuid)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert or fully replace a champion aggregate, keyed by (PUUID, champion, scope).
    pub async fn upsert_champion_aggregate(
        &self,
        aggregate: &model::ChampionAggregate,
    ) -> Result<SqliteQueryResult, error::Error> {
        let scope = aggregate.scope.as_deref().unwrap_or_default();
        let result = sqlx::query(
            "INSERT INTO champion_stats (puuid, champion_id, champion_name, scope, games_played, wins,
                win_rate, avg_kda, avg_cs_per_minute, avg_damage_share, avg_vision_score,
                is_comfort_pick, matchup_win_rates)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(puuid, champion_id, scope) DO UPDATE SET
                champion_name = excluded.champion_name,
                games_played = excluded.games_played,
                wins = excluded.wins,
                win_rate = excluded.win_rate,
                avg_kda = excluded.avg_kda,
                avg_cs_per_minute = excluded.avg_cs_per_minute,
                avg_damage_share = excluded.avg_damage_share,
                avg_vision_score = excluded.avg_vision_score,
                is_comfort_pick = excluded.is_comfort_pick,
                matchup_win_rates = excluded.matchup_win_rates",
        )
        .bind(&aggregate.puuid)
        .bind(aggregate.champion_id)
        .bind(&aggregate.champion_name)
        .bind(scope)
        .bind(aggregate.games_played)
        .bind(aggregate.wins)
        .bind(aggregate.win_rate)
        .bind(aggregate.avg_kda)
        .bind(aggregate.avg_cs_per_minute)
        .bind(aggregate.avg_damage_share)
        .bind(aggregate.avg_vision_score)
        .bind(aggregate.is_comfort_pick)
        .bind(&aggregate.matchup_win_rates)
        .execute(&self.pool)
        .await?;
        Ok(result)
    }

    /// Get the all-time champion aggregates of a PUUID, most played first.
    pub async fn get_champion_aggregates(
        &self,
        puuid: &str,
    ) -> Result<Vec<model::ChampionAggregate>, error::Error> {
        let query = format!(
            "SELECT {AGGREGATE_COLUMNS} FROM champion_stats WHERE puuid = ? AND scope = ''
            ORDER BY games_played DESC, champion_id ASC"
        );
        let aggregates = sqlx::query_as::<_, model::ChampionAggregate>(&query)
            .bind(puuid)
            .fetch_all(&self.pool)
            .await?;
        Ok(aggregates)
    }

    /// Get a champion aggregate by champion name. `scope` of `None` selects all-time.
    pub async fn get_champion_aggregate_by_name(
        &self,
        puuid: &str,
        champion_name: &str,
        scope: Option<&str>,
    ) -> Result<Option<model::ChampionAggregate>, error::Error> {
        let query = format!(
            "SELECT {AGGREGATE_COLUMNS} FROM champion_stats
            WHERE puuid = ? AND champion_name = ? AND scope = ?"
        );
        let aggregate = sqlx::query_as::<_, model::ChampionAggregate>(&query)
            .bind(puuid)
            .bind(champion_name)
            .bind(scope.unwrap_or_default())
            .fetch_optional(&self.pool)
            .await?;
        Ok(aggregate)
    }

    pub async fn get_sync_status(&self, puuid: &str) -> Result<Option<model::SyncStatus>, error::Error> {
        let query = format!("SELECT {SYNC_STATUS_COLUMNS} FROM sync_status WHERE puuid = ?");
        let status = sqlx::query_as::<_, model::SyncStatus>(&query)
            .bind(puuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(status)
    }

    /// Create an idle sync status row for the PUUID unless one exists, then return it.
    pub async fn get_or_create_sync_status(
        &self,
        user_id: &str,
        puuid: &str,
    ) -> Result<model::SyncStatus, error::Error> {
        sqlx::query(
            "INSERT INTO sync_status (user_id, puuid, state) VALUES (?, ?, 'idle')
            ON CONFLICT(puuid) DO NOTHING",
        )
        .bind(user_id)
        .bind(puuid)
        .execute(&self.pool)
        .await?;

        self.get_sync_status(puuid)
            .await?
            .ok_or_else(|| error::Error::MissingData(format!("sync status for {puuid}")))
    }

    /// Move the PUUID into `syncing` in one statement. Returns `false` when the row is
    /// already `syncing`, in which case nothing is written.
    pub async fn try_begin_sync(&self, user_id: &str, puuid: &str) -> Result<bool, error::Error> {
        let result = sqlx::query(
            "INSERT INTO sync_status (user_id, puuid, state) VALUES (?, ?, 'syncing')
            ON CONFLICT(puuid) DO UPDATE SET
                user_id = excluded.user_id,
                state = 'syncing',
                last_error = NULL,
                update_time = CURRENT_TIMESTAMP
            WHERE sync_status.state != 'syncing'",
        )
        .bind(user_id)
        .bind(puuid)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Move a `syncing` PUUID to `idle`, recording the run counters. Returns `false`
    /// if the row was not `syncing`.
    pub async fn complete_sync(
        &self,
        puuid: &str,
        completion: &SyncCompletion,
    ) -> Result<bool, error::Error> {
        let result = sqlx::query(
            "UPDATE sync_status SET
                state = 'idle',
                total_matches_synced = ?,
                last_sync_added_count = ?,
                last_synced_at = ?,
                latest_match_id = COALESCE(?, latest_match_id),
                last_error = NULL,
                update_time = CURRENT_TIMESTAMP
            WHERE puuid = ? AND state = 'syncing'",
        )
        .bind(completion.total_matches_synced)
        .bind(completion.last_sync_added_count)
        .bind(completion.synced_at)
        .bind(&completion.latest_match_id)
        .bind(puuid)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Move a `syncing` PUUID to `error`. Counters are left untouched. Returns `false`
    /// if the row was not `syncing`.
    pub async fn fail_sync(&self, puuid: &str, message: &str) -> Result<bool, error::Error> {
        let result = sqlx::query(
            "UPDATE sync_status SET
                state = 'error',
                last_error = ?,
                update_time = CURRENT_TIMESTAMP
            WHERE puuid = ? AND state = 'syncing'",
        )
        .bind(message)
        .bind(puuid)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
