//! Shared application state for the API layer.
//!
//! Handlers open a fresh connection per request; SQLite serializes the
//! writers and the busy timeout queues them. The notifier is shared as
//! a trait object so tests can observe or drop notifications.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::notify::Notifier;

pub struct AppState {
    db_path: PathBuf,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db_path: PathBuf, notifier: Arc<dyn Notifier>) -> Self {
        Self { db_path, notifier }
    }

    /// Open a database connection for one request.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}
