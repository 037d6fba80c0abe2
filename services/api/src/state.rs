//! Application state shared across handlers

use common::store::Storage;

use crate::{
    passwords::Passwords,
    services::{
        AdminService, CharacterService, EconomyService, GameService, InventoryService,
        MailboxService, MessagingService, UserService,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub economy: EconomyService,
    pub characters: CharacterService,
    pub inventory: InventoryService,
    pub mailbox: MailboxService,
    pub messaging: MessagingService,
    pub games: GameService,
    pub admin: AdminService,
}

impl AppState {
    /// Build every service over one storage handle
    pub fn new(storage: Storage, passwords: Passwords) -> Self {
        Self {
            users: UserService::new(storage.clone(), passwords),
            economy: EconomyService::new(storage.clone()),
            characters: CharacterService::new(storage.clone()),
            inventory: InventoryService::new(storage.clone()),
            mailbox: MailboxService::new(storage.clone()),
            messaging: MessagingService::new(storage.clone()),
            games: GameService::new(storage.clone()),
            admin: AdminService::new(storage),
        }
    }
}
