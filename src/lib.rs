pub mod auth;
pub mod clients;
pub mod config;
pub mod domain;
pub mod server;
pub mod setup;
pub mod storage;
pub mod telemetry;
pub mod web;
