//! User accounts

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Balance every new account starts with
pub const STARTING_CREDITS: i64 = 150;

/// Character every new account owns and has selected
pub const DEFAULT_CHARACTER: &str = "kitty";

/// Stored user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub game_credits: i64,
    pub current_character: String,
    pub owned_characters: Vec<String>,
    pub registered_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    #[serde(default)]
    pub activated: bool,
    #[serde(default)]
    pub activation_code: Option<String>,
    #[serde(default)]
    pub activated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh account with the starting balance and character
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            game_credits: STARTING_CREDITS,
            current_character: DEFAULT_CHARACTER.to_string(),
            owned_characters: vec![DEFAULT_CHARACTER.to_string()],
            registered_at: now,
            last_login: now,
            activated: false,
            activation_code: None,
            activated_at: None,
        }
    }

    pub fn owns(&self, character_id: &str) -> bool {
        self.owned_characters.iter().any(|owned| owned == character_id)
    }

    /// Add a character to the owned set; returns false if it was already owned
    pub fn grant_character(&mut self, character_id: &str) -> bool {
        if self.owns(character_id) {
            return false;
        }
        self.owned_characters.push(character_id.to_string());
        true
    }
}

/// The `users` collection: accounts keyed by email
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserBook(BTreeMap<String, User>);

impl UserBook {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.0.values()
    }

    pub fn get_by_email(&self, email: &str) -> Option<&User> {
        self.0.get(email)
    }

    pub fn get_by_email_mut(&mut self, email: &str) -> Option<&mut User> {
        self.0.get_mut(email)
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&User> {
        self.0.values().find(|user| user.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.0.values_mut().find(|user| user.id == id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.0.values().find(|user| user.username == username)
    }

    pub fn find_by_username_mut(&mut self, username: &str) -> Option<&mut User> {
        self.0.values_mut().find(|user| user.username == username)
    }

    pub fn insert(&mut self, user: User) {
        self.0.insert(user.email.clone(), user);
    }
}

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request for user login; either `email` or `username` identifies the account
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub password: String,
}

/// Query string for user search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// Request for account activation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub activation_code: String,
}

/// Returned after registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub game_credits: i64,
}

impl From<&User> for RegisteredUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            game_credits: user.game_credits,
        }
    }
}

/// Public profile returned after login and by profile lookups
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub game_credits: i64,
    pub current_character: String,
    pub owned_characters: Vec<String>,
    pub activated: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            game_credits: user.game_credits,
            current_character: user.current_character.clone(),
            owned_characters: user.owned_characters.clone(),
            activated: user.activated,
        }
    }
}

/// Search result entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub current_character: String,
    pub last_login: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            current_character: user.current_character.clone(),
            last_login: user.last_login,
        }
    }
}
