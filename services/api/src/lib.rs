//! SkyParty HTTP API
//!
//! Accounts, credits, characters, inventories, gift mailboxes, direct
//! messages, game sessions and admin tooling over a pluggable collection
//! store.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod passwords;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;
