pub mod blacklist;
pub mod error;
pub mod messages;
pub mod models;
pub mod ports;
pub mod users;
