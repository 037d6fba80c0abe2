//! Domain services
//!
//! Each service owns a [`Storage`](common::store::Storage) handle and runs its
//! operations as lock, load, modify, save sequences. Writes to different
//! collections inside one operation are not atomic with each other: a failure
//! part way through leaves the earlier writes in place.

use common::error::StorageError;
use thiserror::Error;

pub mod admin;
pub mod characters;
pub mod economy;
pub mod games;
pub mod inventory;
pub mod mailbox;
pub mod messaging;
pub mod users;

pub use admin::AdminService;
pub use characters::CharacterService;
pub use economy::EconomyService;
pub use games::GameService;
pub use inventory::InventoryService;
pub use mailbox::MailboxService;
pub use messaging::MessagingService;
pub use users::UserService;

/// Failure of a domain operation
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A required field is missing or a value is out of range
    #[error("{0}")]
    Validation(String),

    /// The entity already exists
    #[error("{0}")]
    Conflict(String),

    /// A referenced user or gift does not exist
    #[error("{0}")]
    NotFound(String),

    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Unknown account or wrong password
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Gift has already been claimed")]
    AlreadyClaimed,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Type alias for service results
pub type ServiceResult<T> = Result<T, ServiceError>;

pub(crate) fn require(value: &str, message: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        Err(ServiceError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

pub(crate) fn user_not_found() -> ServiceError {
    ServiceError::NotFound("User not found".to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use common::store::{MemoryStore, Storage};

    use crate::passwords::Passwords;

    pub fn storage() -> Storage {
        Storage::new(Arc::new(MemoryStore::new()))
    }

    pub fn passwords() -> Passwords {
        Passwords::with_params(8, 1, 1).expect("valid argon2 params")
    }
}
