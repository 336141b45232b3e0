//! In-memory implementations of the repository ports.
//!
//! `DashMap` gives each store atomic check-and-insert semantics, which is
//! what closes the resolve-or-create and duplicate-entry races without a
//! database transaction. A relational backend would implement the same
//! traits over unique indexes.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::models::{AttackerIdentifier, BlacklistEntry, Message, Prediction, User};
use crate::domain::ports::{
    AttackerRepo, BlacklistRepo, MessageRepo, PredictionRepo, StoreResult, UserConflict, UserRepo,
};

fn next(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Default)]
pub struct MemoryUsers {
    users: DashMap<i64, User>,
    // value -> user id, the unique-column indexes.
    emails: DashMap<String, i64>,
    phones: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            phones: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserRepo for MemoryUsers {
    async fn get(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .emails
            .get(email)
            .and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    // Both index locks are held across the insert, always acquired in the
    // same email-then-phone order, so the two-column check-and-insert stays
    // atomic. A conflicting save inserts nothing.
    async fn save(&self, mut user: User) -> StoreResult<Result<User, UserConflict>> {
        let email_slot = match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Ok(Err(UserConflict::Email)),
            Entry::Vacant(slot) => slot,
        };
        match self.phones.entry(user.phone.clone()) {
            Entry::Occupied(_) => Ok(Err(UserConflict::Phone)),
            Entry::Vacant(phone_slot) => {
                user.id = next(&self.next_id);
                self.users.insert(user.id, user.clone());
                email_slot.insert(user.id);
                phone_slot.insert(user.id);
                Ok(Ok(user))
            }
        }
    }

    async fn update(&self, user: User) -> StoreResult<()> {
        self.users.insert(user.id, user);
        Ok(())
    }
}

/// Keyed by the unique attacker value so resolve-or-create stays atomic.
#[derive(Debug, Default)]
pub struct MemoryAttackers {
    by_value: DashMap<String, AttackerIdentifier>,
    next_id: AtomicI64,
}

impl MemoryAttackers {
    pub fn new() -> Self {
        Self {
            by_value: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl AttackerRepo for MemoryAttackers {
    async fn get(&self, id: i64) -> StoreResult<Option<AttackerIdentifier>> {
        Ok(self
            .by_value
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.clone()))
    }

    async fn find_by_value(&self, value: &str) -> StoreResult<Option<AttackerIdentifier>> {
        Ok(self.by_value.get(value).map(|a| a.clone()))
    }

    async fn find_or_create(&self, value: &str, kind: &str) -> StoreResult<AttackerIdentifier> {
        let record = self
            .by_value
            .entry(value.to_string())
            .or_insert_with(|| AttackerIdentifier {
                id: next(&self.next_id),
                value: value.to_string(),
                kind: kind.to_string(),
                reputation: 0.0,
                created_at: chrono::Local::now().naive_local(),
            });
        Ok(record.clone())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBlacklist {
    entries: DashMap<i64, BlacklistEntry>,
    // (user_id, attacker_id) -> entry id, the unique-pair index.
    pairs: DashMap<(i64, i64), i64>,
    next_id: AtomicI64,
}

impl MemoryBlacklist {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            pairs: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl BlacklistRepo for MemoryBlacklist {
    async fn get(&self, id: i64) -> StoreResult<Option<BlacklistEntry>> {
        Ok(self.entries.get(&id).map(|e| e.clone()))
    }

    async fn find_by_user(&self, user_id: i64) -> StoreResult<Vec<BlacklistEntry>> {
        let mut found: Vec<BlacklistEntry> = self
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.clone())
            .collect();
        found.sort_by_key(|e| e.id);
        Ok(found)
    }

    async fn insert(&self, mut entry: BlacklistEntry) -> StoreResult<Option<BlacklistEntry>> {
        match self.pairs.entry((entry.user_id, entry.attacker_id)) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                entry.id = next(&self.next_id);
                slot.insert(entry.id);
                self.entries.insert(entry.id, entry.clone());
                Ok(Some(entry))
            }
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        match self.entries.remove(&id) {
            Some((_, entry)) => {
                self.pairs.remove(&(entry.user_id, entry.attacker_id));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryMessages {
    messages: DashMap<i64, Message>,
    next_id: AtomicI64,
}

impl MemoryMessages {
    pub fn new() -> Self {
        Self {
            messages: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn count(&self) -> usize {
        self.messages.len()
    }
}

#[async_trait]
impl MessageRepo for MemoryMessages {
    async fn get(&self, id: i64) -> StoreResult<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }

    async fn save(&self, mut message: Message) -> StoreResult<Message> {
        message.id = next(&self.next_id);
        self.messages.insert(message.id, message.clone());
        Ok(message)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPredictions {
    predictions: DashMap<i64, Prediction>,
    next_id: AtomicI64,
}

impl MemoryPredictions {
    pub fn new() -> Self {
        Self {
            predictions: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn count(&self) -> usize {
        self.predictions.len()
    }
}

#[async_trait]
impl PredictionRepo for MemoryPredictions {
    async fn find_by_message(&self, message_id: i64) -> StoreResult<Vec<Prediction>> {
        let mut found: Vec<Prediction> = self
            .predictions
            .iter()
            .filter(|p| p.message_id == message_id)
            .map(|p| p.clone())
            .collect();
        found.sort_by_key(|p| p.id);
        Ok(found)
    }

    async fn save(&self, mut prediction: Prediction) -> StoreResult<Prediction> {
        prediction.id = next(&self.next_id);
        self.predictions.insert(prediction.id, prediction.clone());
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_or_create_returns_one_record_per_value() {
        let store = MemoryAttackers::new();

        let first = store.find_or_create("evil@x.com", "correo").await.unwrap();
        let second = store.find_or_create("evil@x.com", "telefono").await.unwrap();

        assert_eq!(first.id, second.id);
        // Existing record is returned unchanged, kind included.
        assert_eq!(second.kind, "correo");
        assert_eq!(second.reputation, 0.0);
        assert_eq!(
            store.find_by_value("evil@x.com").await.unwrap().unwrap().id,
            first.id
        );
    }

    #[tokio::test]
    async fn concurrent_find_or_create_never_duplicates() {
        let store = std::sync::Arc::new(MemoryAttackers::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.find_or_create("evil@x.com", "correo").await.unwrap().id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn blacklist_insert_rejects_duplicate_pairs() {
        let store = MemoryBlacklist::new();
        let entry = BlacklistEntry {
            id: 0,
            user_id: 1,
            attacker_id: 9,
            reason: "phish".into(),
            created_at: chrono::Local::now().naive_local(),
        };

        let inserted = store.insert(entry.clone()).await.unwrap().unwrap();
        assert!(inserted.id > 0);
        assert!(store.insert(entry.clone()).await.unwrap().is_none());

        // Same attacker under another user is a distinct pair.
        let other_user = BlacklistEntry { user_id: 2, ..entry };
        assert!(store.insert(other_user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn blacklist_delete_frees_the_pair() {
        let store = MemoryBlacklist::new();
        let entry = BlacklistEntry {
            id: 0,
            user_id: 1,
            attacker_id: 9,
            reason: "phish".into(),
            created_at: chrono::Local::now().naive_local(),
        };

        let inserted = store.insert(entry.clone()).await.unwrap().unwrap();
        assert!(store.delete(inserted.id).await.unwrap());
        assert!(!store.delete(inserted.id).await.unwrap());

        // The pair index was cleared, so the entry can come back.
        assert!(store.insert(entry).await.unwrap().is_some());
    }

    fn sample_user(email: &str, phone: &str) -> User {
        User {
            id: 0,
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            email: email.into(),
            password_hash: "hash".into(),
            phone: phone.into(),
            birth_date: chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            created_at: chrono::Local::now().naive_local(),
        }
    }

    #[tokio::test]
    async fn users_are_found_by_unique_email() {
        let store = MemoryUsers::new();
        let user = store
            .save(sample_user("ana@test.com", "999888777"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.id, 1);
        let found = store.find_by_email("ana@test.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_by_email("ghost@test.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_rejects_taken_email_and_phone() {
        let store = MemoryUsers::new();
        store
            .save(sample_user("ana@test.com", "999888777"))
            .await
            .unwrap()
            .unwrap();

        let dup_email = store
            .save(sample_user("ana@test.com", "111222333"))
            .await
            .unwrap();
        assert_eq!(dup_email.unwrap_err(), UserConflict::Email);

        let dup_phone = store
            .save(sample_user("otra@test.com", "999888777"))
            .await
            .unwrap();
        assert_eq!(dup_phone.unwrap_err(), UserConflict::Phone);

        // A rejected save reserves nothing: the same email and a free phone
        // still go through.
        store
            .save(sample_user("otra@test.com", "111222333"))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_saves_of_one_email_keep_one_record() {
        let store = std::sync::Arc::new(MemoryUsers::new());

        let mut handles = Vec::new();
        for n in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .save(sample_user("ana@test.com", &format!("99988{n:04}")))
                    .await
                    .unwrap()
            }));
        }

        let mut saved = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                saved += 1;
            }
        }
        assert_eq!(saved, 1);
    }
}
