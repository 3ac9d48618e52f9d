//! SQLite-backed conversation log
//!
//! Persists conversation turns locally and serves as a concrete
//! [`ConversationHistory`] for the generators. One `ConversationLog` handle
//! tracks one conversation.

use crate::context::{ConversationHistory, ConversationTurn};
use crate::error::InsightError;
use crate::logging;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::error::Error;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

pub struct ConversationLog {
    conn: Mutex<Connection>,
    conversation_id: String,
}

impl ConversationLog {
    /// Open (or create) a log database at the given path and start a new
    /// conversation in it.
    pub fn open(path: &Path) -> Result<Self, InsightError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory log, useful for tests and throwaway sessions.
    pub fn in_memory() -> Result<Self, InsightError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, InsightError> {
        conn.execute_batch(
            "
            -- Conversation sessions
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Conversation turns, chronological per conversation
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                FOREIGN KEY (conversation_id) REFERENCES conversations(id)
            );
            ",
        )?;

        let conversation_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO conversations (id, created_at, updated_at) VALUES (?1, ?2, ?3)",
            params![conversation_id, now, now],
        )?;

        logging::log_store(None, &format!("Started conversation {}", conversation_id));

        Ok(Self {
            conn: Mutex::new(conn),
            conversation_id,
        })
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Append a turn to the conversation.
    pub fn append(&self, role: &str, content: &str) -> Result<(), InsightError> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO messages (id, conversation_id, role, content, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Uuid::new_v4().to_string(),
                self.conversation_id,
                role,
                content,
                now
            ],
        )?;

        conn.execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![now, self.conversation_id],
        )?;

        Ok(())
    }

    pub fn message_count(&self) -> Result<i64, InsightError> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
            params![self.conversation_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

impl ConversationHistory for ConversationLog {
    fn recent_turns(
        &self,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().unwrap();

        // rowid breaks timestamp ties for turns logged within the same second
        let mut stmt = conn.prepare(
            "SELECT role, content FROM messages
             WHERE conversation_id = ?1
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?2",
        )?;

        let mut turns: Vec<ConversationTurn> = stmt
            .query_map(params![self.conversation_id, limit as i64], |row| {
                Ok(ConversationTurn {
                    role: row.get(0)?,
                    content: row.get(1)?,
                })
            })?
            .collect::<Result<_, _>>()?;

        // Query returns newest-first; callers expect chronological order
        turns.reverse();

        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{extract_context, DEFAULT_MAX_CONTEXT_LENGTH, NO_CONTEXT_PLACEHOLDER};

    #[test]
    fn test_append_and_recent_turns_chronological() {
        let log = ConversationLog::in_memory().unwrap();
        log.append("user", "hello").unwrap();
        log.append("assistant", "hi there").unwrap();
        log.append("user", "tell me about careers").unwrap();

        let turns = log.recent_turns(5).unwrap();

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[2].content, "tell me about careers");
    }

    #[test]
    fn test_recent_turns_respects_limit() {
        let log = ConversationLog::in_memory().unwrap();
        for i in 1..=8 {
            log.append("user", &format!("turn{}", i)).unwrap();
        }

        let turns = log.recent_turns(5).unwrap();

        assert_eq!(turns.len(), 5);
        assert_eq!(turns[0].content, "turn4");
        assert_eq!(turns[4].content, "turn8");
    }

    #[test]
    fn test_empty_log_extracts_placeholder() {
        let log = ConversationLog::in_memory().unwrap();

        assert_eq!(
            extract_context(&log, DEFAULT_MAX_CONTEXT_LENGTH),
            NO_CONTEXT_PLACEHOLDER
        );
    }

    #[test]
    fn test_message_count() {
        let log = ConversationLog::in_memory().unwrap();
        log.append("user", "one").unwrap();
        log.append("assistant", "two").unwrap();

        assert_eq!(log.message_count().unwrap(), 2);
    }
}
