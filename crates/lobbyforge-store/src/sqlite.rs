//! The SQLite lobby store.
//!
//! Two tables: `lobbies` for the lobby row and `lobby_players` for the
//! roster, one row per occupied seat. The seat number is constrained to
//! `0..2` and `(lobby_id, seat)` is the primary key, so the schema itself
//! refuses a third player no matter how the writes interleave.
//!
//! Deleted ids go to `deleted_lobbies` and are refused by `create`.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lobbyforge_protocol::{LobbyId, LobbyStatus, UserId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};

use crate::{LobbyRecord, LobbyStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS lobbies (
      lobby_id   TEXT PRIMARY KEY,
      name       TEXT NOT NULL,
      status     TEXT NOT NULL,
      winner_id  INTEGER,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lobby_players (
      lobby_id TEXT NOT NULL REFERENCES lobbies(lobby_id) ON DELETE CASCADE,
      seat     INTEGER NOT NULL CHECK (seat >= 0 AND seat < 2),
      user_id  INTEGER NOT NULL,
      PRIMARY KEY (lobby_id, seat),
      UNIQUE (lobby_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS deleted_lobbies (
      lobby_id TEXT PRIMARY KEY
    )
    "#,
];

/// A [`LobbyStore`] backed by SQLite through `sqlx`.
#[derive(Debug, Clone)]
pub struct SqliteLobbyStore {
    pool: SqlitePool,
}

impl SqliteLobbyStore {
    /// Opens (creating if missing) the database at `url` and applies the
    /// schema.
    ///
    /// In-memory URLs get a single-connection pool, since every SQLite
    /// connection to `:memory:` is its own database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!(%url, "sqlite lobby store ready");
        Ok(store)
    }

    /// Wraps an existing pool. Call [`migrate`](Self::migrate) before use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they don't exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn current_status(
        tx: &mut Transaction<'_, Sqlite>,
        lobby_id: &LobbyId,
    ) -> Result<LobbyStatus, StoreError> {
        let row = sqlx::query("SELECT status FROM lobbies WHERE lobby_id = ?")
            .bind(lobby_id.as_str())
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(lobby_id.clone()))?;
        parse_status(&row.try_get::<String, _>("status")?)
    }

    async fn load_record(
        tx: &mut Transaction<'_, Sqlite>,
        lobby_id: &LobbyId,
    ) -> Result<LobbyRecord, StoreError> {
        let row = sqlx::query("SELECT * FROM lobbies WHERE lobby_id = ?")
            .bind(lobby_id.as_str())
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(lobby_id.clone()))?;

        let mut record = record_from_row(&row)?;
        record.players = Self::load_players(tx, lobby_id).await?;
        Ok(record)
    }

    async fn load_players(
        tx: &mut Transaction<'_, Sqlite>,
        lobby_id: &LobbyId,
    ) -> Result<Vec<UserId>, StoreError> {
        let rows = sqlx::query("SELECT user_id FROM lobby_players WHERE lobby_id = ? ORDER BY seat")
            .bind(lobby_id.as_str())
            .fetch_all(&mut **tx)
            .await?;
        rows.iter()
            .map(|row| user_id_from(row.try_get::<i64, _>("user_id")?))
            .collect()
    }
}

fn parse_status(raw: &str) -> Result<LobbyStatus, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Corrupt(format!("unknown lobby status {raw:?}")))
}

fn user_id_from(raw: i64) -> Result<UserId, StoreError> {
    u32::try_from(raw)
        .map(UserId)
        .map_err(|_| StoreError::Corrupt(format!("user id {raw} out of range")))
}

fn user_id_to(id: UserId) -> i64 {
    i64::from(id.0)
}

/// Builds a record from a `lobbies` row; the roster is filled in by the
/// caller.
fn record_from_row(row: &SqliteRow) -> Result<LobbyRecord, StoreError> {
    let winner_id = row
        .try_get::<Option<i64>, _>("winner_id")?
        .map(user_id_from)
        .transpose()?;

    Ok(LobbyRecord {
        lobby_id: LobbyId::new(row.try_get::<String, _>("lobby_id")?),
        name: row.try_get("name")?,
        players: Vec::new(),
        status: parse_status(&row.try_get::<String, _>("status")?)?,
        winner_id,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

impl LobbyStore for SqliteLobbyStore {
    async fn create(&self, record: LobbyRecord) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let reused = sqlx::query("SELECT 1 FROM deleted_lobbies WHERE lobby_id = ?")
            .bind(record.lobby_id.as_str())
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if reused {
            return Err(StoreError::AlreadyExists(record.lobby_id));
        }

        let inserted = sqlx::query(
            "INSERT INTO lobbies (lobby_id, name, status, winner_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.lobby_id.as_str())
        .bind(&record.name)
        .bind(record.status.as_str())
        .bind(record.winner_id.map(user_id_to))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::AlreadyExists(record.lobby_id));
            }
            Err(e) => return Err(e.into()),
        }

        for (seat, player) in record.players.iter().enumerate() {
            sqlx::query("INSERT INTO lobby_players (lobby_id, seat, user_id) VALUES (?, ?, ?)")
                .bind(record.lobby_id.as_str())
                .bind(seat as i64)
                .bind(user_id_to(*player))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, lobby_id: &LobbyId) -> Result<LobbyRecord, StoreError> {
        let mut tx = self.pool.begin().await?;
        let record = Self::load_record(&mut tx, lobby_id).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn add_player(&self, lobby_id: &LobbyId, user_id: UserId) -> Result<(), StoreError> {
        // Takes whichever seat is free, and inserts nothing when none is.
        let inserted = sqlx::query(
            "INSERT INTO lobby_players (lobby_id, seat, user_id) \
             SELECT ?1, COALESCE((SELECT 1 - MAX(seat) FROM lobby_players WHERE lobby_id = ?1), 0), ?2 \
             WHERE EXISTS (SELECT 1 FROM lobbies WHERE lobby_id = ?1) \
               AND (SELECT COUNT(*) FROM lobby_players WHERE lobby_id = ?1) < 2",
        )
        .bind(lobby_id.as_str())
        .bind(user_id_to(user_id))
        .execute(&self.pool)
        .await;

        let rows = match inserted {
            Ok(done) => done.rows_affected(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::AlreadySeated(lobby_id.clone(), user_id));
            }
            Err(e) => return Err(e.into()),
        };
        if rows == 1 {
            sqlx::query("UPDATE lobbies SET updated_at = ? WHERE lobby_id = ?")
                .bind(Utc::now())
                .bind(lobby_id.as_str())
                .execute(&self.pool)
                .await?;
            return Ok(());
        }

        // Nothing inserted: either the lobby is gone or it is full.
        self.find_by_id(lobby_id).await?;
        Err(StoreError::RosterFull(lobby_id.clone()))
    }

    async fn seat_player(
        &self,
        lobby_id: &LobbyId,
        user_id: UserId,
    ) -> Result<LobbyRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        // The INSERT goes first so the transaction holds the write lock
        // before anything is read.
        let inserted = sqlx::query(
            "INSERT INTO lobby_players (lobby_id, seat, user_id) \
             SELECT ?1, COALESCE((SELECT 1 - MAX(seat) FROM lobby_players WHERE lobby_id = ?1), 0), ?2 \
             WHERE EXISTS (SELECT 1 FROM lobbies WHERE lobby_id = ?1 AND status = ?3) \
               AND (SELECT COUNT(*) FROM lobby_players WHERE lobby_id = ?1) < 2",
        )
        .bind(lobby_id.as_str())
        .bind(user_id_to(user_id))
        .bind(LobbyStatus::Waiting.as_str())
        .execute(&mut *tx)
        .await;

        let rows = match inserted {
            Ok(done) => done.rows_affected(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::AlreadySeated(lobby_id.clone(), user_id));
            }
            Err(e) => return Err(e.into()),
        };
        if rows == 0 {
            let record = Self::load_record(&mut tx, lobby_id).await?;
            return Err(if record.has_player(user_id) {
                StoreError::AlreadySeated(lobby_id.clone(), user_id)
            } else if record.is_full() {
                StoreError::RosterFull(lobby_id.clone())
            } else {
                StoreError::NotWaiting(lobby_id.clone(), record.status)
            });
        }

        sqlx::query(
            "UPDATE lobbies SET updated_at = ?1, \
               status = CASE WHEN (SELECT COUNT(*) FROM lobby_players WHERE lobby_id = ?2) >= 2 \
                             THEN ?3 ELSE status END \
             WHERE lobby_id = ?2",
        )
        .bind(Utc::now())
        .bind(lobby_id.as_str())
        .bind(LobbyStatus::InProgress.as_str())
        .execute(&mut *tx)
        .await?;

        let record = Self::load_record(&mut tx, lobby_id).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn remove_player(&self, lobby_id: &LobbyId, user_id: UserId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::current_status(&mut tx, lobby_id).await?;

        let removed = sqlx::query("DELETE FROM lobby_players WHERE lobby_id = ? AND user_id = ?")
            .bind(lobby_id.as_str())
            .bind(user_id_to(user_id))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(StoreError::NotSeated(lobby_id.clone(), user_id));
        }

        sqlx::query("UPDATE lobbies SET updated_at = ? WHERE lobby_id = ?")
            .bind(Utc::now())
            .bind(lobby_id.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_status(&self, lobby_id: &LobbyId, status: LobbyStatus) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let from = Self::current_status(&mut tx, lobby_id).await?;
        if !from.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                lobby_id: lobby_id.clone(),
                from,
                to: status,
            });
        }

        // Conditional on the status just read, in case another connection
        // moved it in between.
        let updated = sqlx::query(
            "UPDATE lobbies SET status = ?, updated_at = ? WHERE lobby_id = ? AND status = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(lobby_id.as_str())
        .bind(from.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            let now = Self::current_status(&mut tx, lobby_id).await?;
            return Err(StoreError::InvalidTransition {
                lobby_id: lobby_id.clone(),
                from: now,
                to: status,
            });
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_winner(
        &self,
        lobby_id: &LobbyId,
        winner: Option<UserId>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::current_status(&mut tx, lobby_id).await?;

        if let Some(user_id) = winner {
            let players = Self::load_players(&mut tx, lobby_id).await?;
            if !players.contains(&user_id) {
                return Err(StoreError::NotSeated(lobby_id.clone(), user_id));
            }
        }

        sqlx::query("UPDATE lobbies SET winner_id = ?, updated_at = ? WHERE lobby_id = ?")
            .bind(winner.map(user_id_to))
            .bind(Utc::now())
            .bind(lobby_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_available(&self) -> Result<Vec<LobbyRecord>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query("SELECT * FROM lobbies WHERE status = ? ORDER BY created_at, rowid")
            .bind(LobbyStatus::Waiting.as_str())
            .fetch_all(&mut *tx)
            .await?;

        let seats = sqlx::query(
            "SELECT p.lobby_id, p.user_id FROM lobby_players p \
             JOIN lobbies l ON l.lobby_id = p.lobby_id \
             WHERE l.status = ? ORDER BY p.lobby_id, p.seat",
        )
        .bind(LobbyStatus::Waiting.as_str())
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut rosters: HashMap<String, Vec<UserId>> = HashMap::new();
        for seat in &seats {
            rosters
                .entry(seat.try_get::<String, _>("lobby_id")?)
                .or_default()
                .push(user_id_from(seat.try_get::<i64, _>("user_id")?)?);
        }

        rows.iter()
            .map(|row| {
                let mut record = record_from_row(row)?;
                record.players = rosters.remove(record.lobby_id.as_str()).unwrap_or_default();
                Ok::<_, StoreError>(record)
            })
            .collect()
    }

    async fn delete(&self, lobby_id: &LobbyId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM lobby_players WHERE lobby_id = ?")
            .bind(lobby_id.as_str())
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM lobbies WHERE lobby_id = ?")
            .bind(lobby_id.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StoreError::NotFound(lobby_id.clone()));
        }

        sqlx::query("INSERT OR IGNORE INTO deleted_lobbies (lobby_id) VALUES (?)")
            .bind(lobby_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(%lobby_id, "lobby row deleted");
        Ok(())
    }
}
