//! Person store module
//!
//! A document-collection client with an owned connection lifecycle. The
//! collection lives in memory behind an async lock and is flushed to a
//! JSON data file after every successful mutation when a file is
//! configured. Handlers never touch the collection directly; everything
//! goes through the client, which enforces the record constraints at
//! write time.

mod person;

pub use person::{Gender, Person, PersonInput, ValidatedFields};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::logger;

/// A single field constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: &str) -> Self {
        Self {
            field,
            reason: reason.to_string(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, "is required")
    }
}

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection is not currently established.
    #[error("store not connected")]
    Unavailable,
    /// The given id is not a well-formed identifier.
    #[error("invalid person id '{0}'")]
    InvalidId(String),
    /// A field constraint was violated; nothing was persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Reading or writing the data file failed.
    #[error("store persistence failed: {0}")]
    Persist(String),
}

/// Connection lifecycle state, queryable without locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

const STATUS_DISCONNECTED: u8 = 0;
const STATUS_CONNECTING: u8 = 1;
const STATUS_CONNECTED: u8 = 2;
const STATUS_FAILED: u8 = 3;

impl ConnectionStatus {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Disconnected => STATUS_DISCONNECTED,
            Self::Connecting => STATUS_CONNECTING,
            Self::Connected => STATUS_CONNECTED,
            Self::Failed => STATUS_FAILED,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            STATUS_CONNECTING => Self::Connecting,
            STATUS_CONNECTED => Self::Connected,
            STATUS_FAILED => Self::Failed,
            _ => Self::Disconnected,
        }
    }
}

/// The process-wide store client. Constructed once at startup, opened
/// with `connect`, injected into the application state, and closed on
/// shutdown.
pub struct PersonStore {
    /// Data file holding the collection as JSON. `None` keeps the
    /// collection purely in memory (used by tests).
    data_file: Option<PathBuf>,
    collection: RwLock<BTreeMap<String, Person>>,
    status: AtomicU8,
}

impl PersonStore {
    pub fn new(data_file: Option<PathBuf>) -> Self {
        Self {
            data_file,
            collection: RwLock::new(BTreeMap::new()),
            status: AtomicU8::new(STATUS_DISCONNECTED),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.status.load(Ordering::Relaxed))
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.status.store(status.as_u8(), Ordering::Relaxed);
    }

    /// Establish the connection: load the collection from the data file.
    /// A missing file means an empty collection; an unreadable or
    /// unparsable file is an error and leaves the client in the failed
    /// state (fatal at startup).
    pub async fn connect(&self) -> Result<(), StoreError> {
        self.set_status(ConnectionStatus::Connecting);

        if let Some(path) = &self.data_file {
            match tokio::fs::read_to_string(path).await {
                Ok(content) => {
                    let loaded: BTreeMap<String, Person> = serde_json::from_str(&content)
                        .map_err(|e| {
                            self.set_status(ConnectionStatus::Failed);
                            StoreError::Persist(format!(
                                "failed to parse {}: {e}",
                                path.display()
                            ))
                        })?;
                    let count = loaded.len();
                    *self.collection.write().await = loaded;
                    logger::log_store_loaded(count, &path.display().to_string());
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    logger::log_store_empty(&path.display().to_string());
                }
                Err(e) => {
                    self.set_status(ConnectionStatus::Failed);
                    return Err(StoreError::Persist(format!(
                        "failed to read {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        self.set_status(ConnectionStatus::Connected);
        Ok(())
    }

    /// Flush the collection and drop the connection. Safe to call when
    /// already disconnected.
    pub async fn close(&self) -> Result<(), StoreError> {
        if self.is_connected() {
            let collection = self.collection.read().await;
            self.flush(&collection).await?;
        }
        self.set_status(ConnectionStatus::Disconnected);
        Ok(())
    }

    /// All records in store-default order.
    pub async fn list_all(&self) -> Result<Vec<Person>, StoreError> {
        self.check_connected()?;
        let collection = self.collection.read().await;
        Ok(collection.values().cloned().collect())
    }

    /// Look up one record. `Ok(None)` means the id is well-formed but no
    /// record carries it.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Person>, StoreError> {
        self.check_connected()?;
        Self::check_id(id)?;
        let collection = self.collection.read().await;
        Ok(collection.get(id).cloned())
    }

    /// Validate the input and persist a new record with a fresh id.
    pub async fn create(&self, input: &PersonInput) -> Result<Person, StoreError> {
        self.check_connected()?;
        let fields = input.validate()?;
        let person = fields.into_person(Uuid::new_v4().to_string());

        let mut collection = self.collection.write().await;
        collection.insert(person.id.clone(), person.clone());
        self.flush(&collection).await?;
        Ok(person)
    }

    /// Re-validate and replace all four fields of the record with `id`.
    /// `Ok(None)` if no such record exists; the id itself never changes.
    pub async fn update(
        &self,
        id: &str,
        input: &PersonInput,
    ) -> Result<Option<Person>, StoreError> {
        self.check_connected()?;
        Self::check_id(id)?;
        let fields = input.validate()?;

        let mut collection = self.collection.write().await;
        if !collection.contains_key(id) {
            return Ok(None);
        }
        let person = fields.into_person(id.to_string());
        collection.insert(id.to_string(), person.clone());
        self.flush(&collection).await?;
        Ok(Some(person))
    }

    /// Hard-delete the record with `id`, returning it. `Ok(None)` if it
    /// was already absent.
    pub async fn delete(&self, id: &str) -> Result<Option<Person>, StoreError> {
        self.check_connected()?;
        Self::check_id(id)?;

        let mut collection = self.collection.write().await;
        let removed = collection.remove(id);
        if removed.is_some() {
            self.flush(&collection).await?;
        }
        Ok(removed)
    }

    fn check_connected(&self) -> Result<(), StoreError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    fn check_id(id: &str) -> Result<(), StoreError> {
        Uuid::parse_str(id)
            .map(|_| ())
            .map_err(|_| StoreError::InvalidId(id.to_string()))
    }

    /// Write the collection back to the data file. No-op for in-memory
    /// clients.
    async fn flush(&self, collection: &BTreeMap<String, Person>) -> Result<(), StoreError> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(collection)
            .map_err(|e| StoreError::Persist(format!("failed to serialize collection: {e}")))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| StoreError::Persist(format!("failed to write {}: {e}", path.display())))
    }
}
