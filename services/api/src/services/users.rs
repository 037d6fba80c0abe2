//! Registration, login, search and activation

use chrono::Utc;
use common::store::Storage;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult, require, user_not_found};
use crate::{
    models::{
        collections,
        user::{RegisteredUser, User, UserBook, UserProfile, UserSummary},
    },
    passwords::Passwords,
};

/// Activation codes that unlock premium status
pub const ACTIVATION_CODES: [&str; 10] = [
    "SKYP-ARTY-2024-GOLD",
    "TEST-CODE-ABCD-1234",
    "DEMO-FULL-ACCE-XYZ",
    "PREM-IUMU-SER2-024",
    "VIPM-EMBE-RCOD-E123",
    "BETA-TEST-ER20-24",
    "EARL-YBIR-DSPE-CIAL",
    "FOUN-DER2-024-CODE",
    "GOLD-ENTI-CKET-CODE",
    "PLAT-INUM-ACCE-SS24",
];

/// How a login request identifies the account
#[derive(Debug, Clone)]
pub enum LoginIdentifier {
    Email(String),
    Username(String),
}

/// Account management
#[derive(Clone)]
pub struct UserService {
    storage: Storage,
    passwords: Passwords,
}

impl UserService {
    pub fn new(storage: Storage, passwords: Passwords) -> Self {
        Self { storage, passwords }
    }

    /// Create an account and its empty inventory and mailbox
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<RegisteredUser> {
        let required = "Username, email, and password are required";
        require(username, required)?;
        require(email, required)?;
        require(password, required)?;

        let username = username.trim().to_string();
        let email = email.trim().to_string();
        let password_hash = self.hash_password(password.to_string()).await?;

        let _lock = self.storage.lock([collections::USERS]).await;
        let mut users: UserBook = self.storage.load(collections::USERS).await?;

        if users.get_by_email(&email).is_some() {
            warn!("Registration rejected: email {} already registered", email);
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }
        if users.find_by_username(&username).is_some() {
            warn!("Registration rejected: username {} already taken", username);
            return Err(ServiceError::Conflict("Username already taken".to_string()));
        }

        let user = User::new(username, email, password_hash);
        let registered = RegisteredUser::from(&user);
        let user_id = user.id;
        users.insert(user);
        self.storage.save(collections::USERS, &users).await?;

        self.storage
            .save(&collections::inventory(user_id), &json!([]))
            .await?;
        self.storage
            .save(&collections::mailbox(user_id), &json!([]))
            .await?;

        info!("Registered user {} ({})", registered.username, user_id);
        Ok(registered)
    }

    /// Verify credentials and stamp `lastLogin`
    ///
    /// A [`LoginIdentifier::Username`] also matches the account's email.
    pub async fn login(
        &self,
        identifier: LoginIdentifier,
        password: &str,
    ) -> ServiceResult<UserProfile> {
        require(password, "Password is required")?;

        // Verify against a snapshot so the users lock is not held while hashing.
        let snapshot: UserBook = self.storage.load(collections::USERS).await?;
        let stored_hash = match find(&snapshot, &identifier) {
            Some(user) => user.password_hash.clone(),
            None => {
                warn!("Login failed: unknown account {:?}", identifier);
                return Err(ServiceError::Unauthorized);
            }
        };

        if !self.verify_password(password.to_string(), stored_hash).await? {
            warn!("Login failed: wrong password for {:?}", identifier);
            return Err(ServiceError::Unauthorized);
        }

        let _lock = self.storage.lock([collections::USERS]).await;
        let mut users: UserBook = self.storage.load(collections::USERS).await?;
        let user = find_mut(&mut users, &identifier).ok_or(ServiceError::Unauthorized)?;
        user.last_login = Utc::now();
        let profile = UserProfile::from(&*user);
        self.storage.save(collections::USERS, &users).await?;

        info!("User {} logged in", profile.id);
        Ok(profile)
    }

    /// Case-insensitive username substring search; an empty query matches nobody
    pub async fn search(&self, query: &str) -> ServiceResult<Vec<UserSummary>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let users: UserBook = self.storage.load(collections::USERS).await?;
        let mut matches: Vec<UserSummary> = users
            .iter()
            .filter(|user| user.username.to_lowercase().contains(&query))
            .map(UserSummary::from)
            .collect();
        matches.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(matches)
    }

    /// Redeem an activation code for the account registered under `email`
    pub async fn activate(&self, email: &str, code: &str) -> ServiceResult<()> {
        if !ACTIVATION_CODES.contains(&code) {
            warn!("Activation rejected for {}: invalid code", email);
            return Err(ServiceError::Validation(
                "Invalid activation code".to_string(),
            ));
        }

        let _lock = self.storage.lock([collections::USERS]).await;
        let mut users: UserBook = self.storage.load(collections::USERS).await?;
        let user = users.get_by_email_mut(email).ok_or_else(user_not_found)?;

        user.activated = true;
        user.activation_code = Some(code.to_string());
        user.activated_at = Some(Utc::now());
        let user_id = user.id;
        self.storage.save(collections::USERS, &users).await?;

        info!("User {} activated", user_id);
        Ok(())
    }

    /// Public profile of one user
    pub async fn profile(&self, user_id: Uuid) -> ServiceResult<UserProfile> {
        let users: UserBook = self.storage.load(collections::USERS).await?;
        users
            .find_by_id(user_id)
            .map(UserProfile::from)
            .ok_or_else(user_not_found)
    }

    async fn hash_password(&self, password: String) -> ServiceResult<String> {
        let passwords = self.passwords.clone();
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| ServiceError::PasswordHash(e.to_string()))?
            .map_err(|e| ServiceError::PasswordHash(e.to_string()))
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> ServiceResult<bool> {
        let passwords = self.passwords.clone();
        tokio::task::spawn_blocking(move || passwords.verify(&password, &stored_hash))
            .await
            .map_err(|e| ServiceError::PasswordHash(e.to_string()))
    }
}

// A username identifier that matches no username is tried as an email.
fn find<'a>(users: &'a UserBook, identifier: &LoginIdentifier) -> Option<&'a User> {
    match identifier {
        LoginIdentifier::Email(email) => users.get_by_email(email),
        LoginIdentifier::Username(name) => users
            .find_by_username(name)
            .or_else(|| users.get_by_email(name)),
    }
}

fn find_mut<'a>(users: &'a mut UserBook, identifier: &LoginIdentifier) -> Option<&'a mut User> {
    match identifier {
        LoginIdentifier::Email(email) => users.get_by_email_mut(email),
        LoginIdentifier::Username(name) => {
            if users.find_by_username(name).is_some() {
                users.find_by_username_mut(name)
            } else {
                users.get_by_email_mut(name)
            }
        }
    }
}
