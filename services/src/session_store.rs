//! Ephemeral store for attendance sessions that are still open.
//!
//! The store exclusively owns in-progress state between `StartSession` and
//! `FinalizeSession`. Two backends are provided:
//!
//! - [`MemoryStore`]: a mutex-guarded map, used for single-node deployments and tests.
//! - [`RedisStore`]: one Redis hash per session under `attendance_session:{id}`.
//!   The hash holds a `meta` field (teacher id and coordinates as JSON) plus one
//!   `student:{id}` field per enrolled student whose value is the status.
//!
//! Check-in is an atomic per-student update in both backends, and finalize takes
//! the entry (read + delete) in one step, so a second finalize observes nothing.

use std::collections::HashMap;

use async_trait::async_trait;
use db::models::attendance_record::{AttendanceStatus, StudentRecords};
use once_cell::sync::Lazy;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::AppError;

/// In-progress state of one attendance session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSession {
    pub attendance_id: i64,
    pub teacher_id: i64,
    pub teacher_latitude: f64,
    pub teacher_longitude: f64,
    pub student_records: StudentRecords,
}

/// Result of an atomic per-student status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    /// The session exists but the student is not on its roster.
    NotEnrolled,
    /// No cached session under that id (never started or already finalized).
    SessionMissing,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a freshly started session, replacing any entry under the same id.
    async fn put(&self, session: &CachedSession) -> Result<(), AppError>;

    async fn get(&self, attendance_id: i64) -> Result<Option<CachedSession>, AppError>;

    /// Atomically sets one student's status without touching the rest of the map.
    async fn mark(
        &self,
        attendance_id: i64,
        student_id: i64,
        status: AttendanceStatus,
    ) -> Result<MarkOutcome, AppError>;

    /// Atomically reads and removes a session.
    async fn take(&self, attendance_id: i64) -> Result<Option<CachedSession>, AppError>;
}

pub fn session_key(attendance_id: i64) -> String {
    format!("attendance_session:{attendance_id}")
}

// --- In-memory backend ---

#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<i64, CachedSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put(&self, session: &CachedSession) -> Result<(), AppError> {
        self.sessions
            .lock()
            .await
            .insert(session.attendance_id, session.clone());
        Ok(())
    }

    async fn get(&self, attendance_id: i64) -> Result<Option<CachedSession>, AppError> {
        Ok(self.sessions.lock().await.get(&attendance_id).cloned())
    }

    async fn mark(
        &self,
        attendance_id: i64,
        student_id: i64,
        status: AttendanceStatus,
    ) -> Result<MarkOutcome, AppError> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(&attendance_id) else {
            return Ok(MarkOutcome::SessionMissing);
        };
        if session.student_records.set(student_id, status) {
            Ok(MarkOutcome::Marked)
        } else {
            Ok(MarkOutcome::NotEnrolled)
        }
    }

    async fn take(&self, attendance_id: i64) -> Result<Option<CachedSession>, AppError> {
        Ok(self.sessions.lock().await.remove(&attendance_id))
    }
}

// --- Redis backend ---

const META_FIELD: &str = "meta";
const STUDENT_PREFIX: &str = "student:";

/// Returns -1 if the session hash is gone, 0 if the student is not on the
/// roster, 1 after updating the status.
static MARK_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 0 then
            return -1
        end
        if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 0 then
            return 0
        end
        redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
        return 1
        ",
    )
});

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionMeta {
    attendance_id: i64,
    teacher_id: i64,
    teacher_latitude: f64,
    teacher_longitude: f64,
}

fn student_field(student_id: i64) -> String {
    format!("{STUDENT_PREFIX}{student_id}")
}

fn encode(session: &CachedSession) -> Result<Vec<(String, String)>, AppError> {
    let meta = SessionMeta {
        attendance_id: session.attendance_id,
        teacher_id: session.teacher_id,
        teacher_latitude: session.teacher_latitude,
        teacher_longitude: session.teacher_longitude,
    };

    let mut fields = Vec::with_capacity(session.student_records.len() + 1);
    fields.push((META_FIELD.to_string(), serde_json::to_string(&meta)?));
    for (student_id, status) in session.student_records.iter() {
        fields.push((student_field(student_id), status.to_string()));
    }
    Ok(fields)
}

fn decode(fields: HashMap<String, String>) -> Result<Option<CachedSession>, AppError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let meta: SessionMeta = match fields.get(META_FIELD) {
        Some(raw) => serde_json::from_str(raw)?,
        None => return Err(AppError::internal("Cached session is missing its metadata")),
    };

    let mut pairs = Vec::with_capacity(fields.len().saturating_sub(1));
    for (field, value) in &fields {
        let Some(id) = field.strip_prefix(STUDENT_PREFIX) else {
            continue;
        };
        let id: i64 = id
            .parse()
            .map_err(|_| AppError::internal(format!("Invalid student field '{field}'")))?;
        let status: AttendanceStatus = value
            .parse()
            .map_err(|_| AppError::internal(format!("Invalid status '{value}'")))?;
        pairs.push((id, status));
    }

    let mut student_records = StudentRecords::all_absent(pairs.iter().map(|(id, _)| *id));
    student_records.merge_overrides(pairs);

    Ok(Some(CachedSession {
        attendance_id: meta.attendance_id,
        teacher_id: meta.teacher_id,
        teacher_latitude: meta.teacher_latitude,
        teacher_longitude: meta.teacher_longitude,
        student_records,
    }))
}

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        tracing::info!(target: "services::session_store", "Connected to Redis session cache");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn put(&self, session: &CachedSession) -> Result<(), AppError> {
        let key = session_key(session.attendance_id);
        let fields = encode(session)?;
        let mut conn = self.conn.clone();

        let _: () = redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, attendance_id: i64) -> Result<Option<CachedSession>, AppError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(session_key(attendance_id)).await?;
        decode(fields)
    }

    async fn mark(
        &self,
        attendance_id: i64,
        student_id: i64,
        status: AttendanceStatus,
    ) -> Result<MarkOutcome, AppError> {
        let mut conn = self.conn.clone();
        let outcome: i32 = MARK_SCRIPT
            .key(session_key(attendance_id))
            .arg(student_field(student_id))
            .arg(status.to_string())
            .invoke_async(&mut conn)
            .await?;

        Ok(match outcome {
            1 => MarkOutcome::Marked,
            0 => MarkOutcome::NotEnrolled,
            _ => MarkOutcome::SessionMissing,
        })
    }

    async fn take(&self, attendance_id: i64) -> Result<Option<CachedSession>, AppError> {
        let key = session_key(attendance_id);
        let mut conn = self.conn.clone();

        let (fields,): (HashMap<String, String>,) = redis::pipe()
            .atomic()
            .hgetall(&key)
            .del(&key)
            .ignore()
            .query_async(&mut conn)
            .await?;
        decode(fields)
    }
}
