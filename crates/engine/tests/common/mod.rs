#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::{DateTime, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    CreateLekkaCmd, Currency, Engine, FriendRef, Lekka, LekkaKind, Money, Notification, Notifier,
    NotifyError, TokenPolicy,
};
use migration::MigratorTrait;
use uuid::Uuid;

/// Keeps every delivered notification; can be switched to failing.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("gateway down".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Rejects every token, as an aggressive expiry would.
pub struct RejectAll;

impl TokenPolicy for RejectAll {
    fn accepts(&self, _issued_at: DateTime<Utc>, _now: DateTime<Utc>) -> bool {
        false
    }
}

pub async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine_with(
    notifier: Arc<RecordingNotifier>,
    policy: Option<Arc<dyn TokenPolicy>>,
) -> Engine {
    let mut builder = Engine::builder()
        .database(database().await)
        .currency(Currency::Inr)
        .notifier(notifier);
    if let Some(policy) = policy {
        builder = builder.token_policy(policy);
    }
    let engine = builder.build().await.unwrap();
    engine.register_user("alice", "Alice", Some("+91 90000 00001")).await.unwrap();
    engine.register_user("bob", "Bob", None).await.unwrap();
    engine
}

/// Engine over a fresh sqlite file, so concurrent callers get their own
/// pooled connections. Remove the file with [`remove_database_file`].
pub async fn file_engine() -> (Arc<Engine>, PathBuf) {
    let path = std::env::temp_dir().join(format!("lekka-{}.db", Uuid::new_v4()));
    let db = Database::connect(format!("sqlite:{}?mode=rwc", path.display()))
        .await
        .unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let engine = Engine::builder()
        .database(db)
        .currency(Currency::Inr)
        .notifier(Arc::new(RecordingNotifier::default()))
        .build()
        .await
        .unwrap();
    engine.register_user("alice", "Alice", None).await.unwrap();
    engine.register_user("bob", "Bob", None).await.unwrap();
    (Arc::new(engine), path)
}

pub fn remove_database_file(path: &Path) {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

pub async fn engine() -> (Engine, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    (engine_with(notifier.clone(), None).await, notifier)
}

pub fn inr(minor: i64) -> Money {
    Money::new(minor, Currency::Inr)
}

pub async fn lend_to(engine: &Engine, friend: FriendRef, minor: i64) -> Lekka {
    engine
        .create_lekka(CreateLekkaCmd::new("alice", friend, LekkaKind::Lent, inr(minor)))
        .await
        .unwrap()
}

pub fn token_of(lekka: &Lekka) -> String {
    lekka.confirmation_token().unwrap().as_str().to_string()
}
