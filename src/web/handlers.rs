pub mod auth;
pub mod blacklist;
pub mod health;
pub mod messages;
