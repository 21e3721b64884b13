pub mod billing;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod i18n;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod state;
