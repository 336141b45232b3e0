use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Wire format for timestamps (`creadoEn`, CSV dates).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A registered account. Never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// A deduplicated attacker identifier (email address or phone number),
/// shared across every user that blacklists the same value.
///
/// `reputation` is persisted but never updated by any code path; the
/// scoring feature was planned upstream and never landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackerIdentifier {
    pub id: i64,
    pub value: String,
    /// "correo" or "telefono".
    pub kind: String,
    pub reputation: f64,
    pub created_at: NaiveDateTime,
}

/// One user's blacklisting of one attacker. The (user_id, attacker_id)
/// pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: i64,
    pub user_id: i64,
    pub attacker_id: i64,
    pub reason: String,
    pub created_at: NaiveDateTime,
}

/// A reported message awaiting or holding classification results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub user_id: Option<i64>,
    pub content: String,
    pub message_type: String,
    pub source: String,
    pub sender: String,
    pub status: String,
    pub received_at: NaiveDateTime,
}

/// Classifier verdict for a message. A message accumulates one row per
/// model run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    pub message_id: i64,
    pub model: String,
    pub label: String,
    pub confidence: f32,
    pub analyzed_at: NaiveDateTime,
}

/// Blacklist entry joined with its attacker record, as served to clients.
#[derive(Debug, Clone)]
pub struct BlacklistEntryView {
    pub entry: BlacklistEntry,
    pub attacker: AttackerIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistStats {
    pub total: usize,
    pub blocked_today: usize,
    pub blocked_this_week: usize,
    pub avg_risk_level: String,
}

/// Outcome of a best-effort CSV import. Bad rows are counted, never fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub success: u32,
    pub errors: u32,
}

/// What the upstream classifier answered for one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictOutcome {
    pub model: String,
    pub label: String,
    pub confidence: f32,
}
