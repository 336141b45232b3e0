//! Interfaces the services depend on. Storage backends and the upstream
//! classifier plug in behind these traits.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use color_eyre::Report;
use thiserror::Error;

use crate::domain::models::{
    AttackerIdentifier, BlacklistEntry, Message, PredictOutcome, Prediction, User,
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error type for storage operations.
#[derive(Debug)]
pub struct StoreError {
    error: Report,
}

impl StoreError {
    pub fn new<T>(error: T) -> Self
    where
        T: StdError + Send + Sync + 'static,
    {
        Self {
            error: Report::new(error),
        }
    }

    pub fn msg<T>(message: T) -> Self
    where
        T: fmt::Debug + fmt::Display + Send + Sync + 'static,
    {
        Self {
            error: Report::msg(message),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// The unique user column a `save` collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserConflict {
    Email,
    Phone,
}

/// Account persistence. The store assigns ids; the id on a `save` input is
/// ignored.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, id: i64) -> StoreResult<Option<User>>;

    /// Exact match on the unique email column.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Inserts the user unless the email or phone is already taken. The
    /// check-and-insert is atomic; email collisions win when both columns
    /// are taken.
    async fn save(&self, user: User) -> StoreResult<Result<User, UserConflict>>;

    /// Replaces an existing record in place, matching on id. The unique
    /// columns are not re-checked; callers only rotate the password hash.
    async fn update(&self, user: User) -> StoreResult<()>;
}

/// The deduplicated attacker registry.
#[async_trait]
pub trait AttackerRepo: Send + Sync {
    async fn get(&self, id: i64) -> StoreResult<Option<AttackerIdentifier>>;

    /// Exact, case-sensitive value lookup.
    async fn find_by_value(&self, value: &str) -> StoreResult<Option<AttackerIdentifier>>;

    /// Returns the record for `value`, creating it with the given kind and
    /// zero reputation when absent. Atomic: concurrent calls for the same
    /// new value observe a single record. An existing record is returned
    /// unchanged even when the caller passes a different kind.
    async fn find_or_create(&self, value: &str, kind: &str) -> StoreResult<AttackerIdentifier>;
}

/// Per-user blacklist entries.
#[async_trait]
pub trait BlacklistRepo: Send + Sync {
    async fn get(&self, id: i64) -> StoreResult<Option<BlacklistEntry>>;

    async fn find_by_user(&self, user_id: i64) -> StoreResult<Vec<BlacklistEntry>>;

    /// Inserts the entry unless its (user, attacker) pair is already
    /// present. The check-and-insert is atomic; `None` signals the
    /// duplicate.
    async fn insert(&self, entry: BlacklistEntry) -> StoreResult<Option<BlacklistEntry>>;

    /// Removes an entry, reporting whether it existed. The shared attacker
    /// record is never touched.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn get(&self, id: i64) -> StoreResult<Option<Message>>;

    async fn save(&self, message: Message) -> StoreResult<Message>;
}

#[async_trait]
pub trait PredictionRepo: Send + Sync {
    async fn find_by_message(&self, message_id: i64) -> StoreResult<Vec<Prediction>>;

    async fn save(&self, prediction: Prediction) -> StoreResult<Prediction>;
}

/// Transport or upstream failure while classifying a message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PredictorError(pub String);

/// Outbound classification service.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, text: &str) -> Result<PredictOutcome, PredictorError>;
}
