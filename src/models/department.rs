use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hospital department (Cardiology, Neurology, ...). Owns zero or more
/// doctors; deleting a department detaches them rather than cascading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// FontAwesome icon class shown by the front end.
    pub icon: String,
    pub created_at: NaiveDateTime,
}
