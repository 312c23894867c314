use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a user profile this service reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    /// Local part of the user's personal import address.
    pub email_import_id: String,
}

impl Profile {
    pub fn import_address(&self, domain: &str) -> String {
        format!("{}@{}", self.email_import_id, domain)
    }
}
