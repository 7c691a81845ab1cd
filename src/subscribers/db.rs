use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::logger::{self, LogTag};
use crate::status::Verdict;

/// One persisted subscriber row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub chat_id: i64,
    pub auto_notify: bool,
    pub last_verdict: Option<Verdict>,
}

/// Thread-safe subscriber store. All operations serialize on the connection
/// mutex, so the monitor's snapshot reads cannot observe a partially applied
/// command-path mutation.
pub struct SubscriberDb {
    conn: Mutex<Connection>,
}

impl SubscriberDb {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create database directory")?;
            }
        }

        let conn = Connection::open(&db_path).context("Failed to open subscriber database")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;

        logger::info(
            LogTag::Db,
            &format!(
                "Subscriber database ready at {}",
                db_path.as_ref().display()
            ),
        );

        Ok(db)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory database")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS subscribers (
                chat_id INTEGER PRIMARY KEY,
                auto_notify INTEGER NOT NULL DEFAULT 0,
                last_verdict TEXT
            )",
            [],
        )
        .context("Failed to create subscribers table")?;

        Ok(())
    }

    /// Insert the subscriber if absent. Re-registration is a no-op, and
    /// concurrent creation cannot duplicate the row.
    pub fn upsert(&self, chat_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT OR IGNORE INTO subscribers (chat_id) VALUES (?1)",
            params![chat_id],
        )
        .context("Failed to upsert subscriber")?;

        Ok(())
    }

    /// Toggle auto notifications. Returns false (no-op) when the chat id is
    /// unknown - the row is never created here.
    pub fn set_auto_notify(&self, chat_id: i64, enabled: bool) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let updated = conn
            .execute(
                "UPDATE subscribers SET auto_notify = ?2 WHERE chat_id = ?1",
                params![chat_id, enabled as i64],
            )
            .context("Failed to update auto_notify")?;

        Ok(updated > 0)
    }

    /// Record the verdict the subscriber was last successfully told about
    pub fn update_last_verdict(&self, chat_id: i64, verdict: Verdict) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "UPDATE subscribers SET last_verdict = ?2 WHERE chat_id = ?1",
            params![chat_id, verdict.as_str()],
        )
        .context("Failed to update last_verdict")?;

        Ok(())
    }

    /// Remove the subscriber. Returns false when the chat id was unknown.
    pub fn delete(&self, chat_id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let deleted = conn
            .execute(
                "DELETE FROM subscribers WHERE chat_id = ?1",
                params![chat_id],
            )
            .context("Failed to delete subscriber")?;

        Ok(deleted > 0)
    }

    /// Snapshot of all auto-enabled subscribers with their last verdict.
    /// Runs as a single statement under the connection lock, so the monitor
    /// never sees a torn view of command-path mutations.
    pub fn list_auto_enabled(&self) -> Result<Vec<(i64, Option<Verdict>)>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT chat_id, last_verdict FROM subscribers
                 WHERE auto_notify = 1 ORDER BY chat_id",
            )
            .context("Failed to prepare subscriber query")?;

        let rows = stmt
            .query_map([], |row| {
                let chat_id: i64 = row.get(0)?;
                let verdict: Option<String> = row.get(1)?;
                Ok((chat_id, verdict))
            })
            .context("Failed to query auto-enabled subscribers")?;

        let mut subscribers = Vec::new();
        for row in rows {
            let (chat_id, verdict) = row.context("Failed to read subscriber row")?;
            subscribers.push((chat_id, verdict.as_deref().and_then(Verdict::from_str)));
        }

        Ok(subscribers)
    }

    /// Fetch one subscriber by chat id
    pub fn get(&self, chat_id: i64) -> Result<Option<Subscriber>> {
        let conn = self.conn.lock().unwrap();

        let subscriber = conn
            .query_row(
                "SELECT chat_id, auto_notify, last_verdict FROM subscribers
                 WHERE chat_id = ?1",
                params![chat_id],
                |row| {
                    let verdict: Option<String> = row.get(2)?;
                    Ok(Subscriber {
                        chat_id: row.get(0)?,
                        auto_notify: row.get::<_, i64>(1)? != 0,
                        last_verdict: verdict.as_deref().and_then(Verdict::from_str),
                    })
                },
            )
            .optional()
            .context("Failed to fetch subscriber")?;

        Ok(subscriber)
    }
}
