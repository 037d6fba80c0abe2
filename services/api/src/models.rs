//! Domain records and request/response payloads
//!
//! Stored records serialize with camelCase keys so the persisted documents
//! keep the layout existing clients and backups expect.

pub mod admin;
pub mod character;
pub mod economy;
pub mod game;
pub mod inventory;
pub mod mailbox;
pub mod messaging;
pub mod user;

/// Names of the stored collections
pub mod collections {
    use uuid::Uuid;

    pub const USERS: &str = "users";
    pub const TRANSACTIONS: &str = "transactions";
    pub const GAME_SESSIONS: &str = "game_sessions";
    pub const CONVERSATIONS: &str = "conversations";

    /// Per-user inventory collection
    pub fn inventory(user_id: Uuid) -> String {
        format!("inventory_{user_id}")
    }

    /// Per-user mailbox collection, newest gift first
    pub fn mailbox(user_id: Uuid) -> String {
        format!("mailbox_{user_id}")
    }
}
