pub mod avatar;
pub mod config;
pub mod constants;
pub mod error;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;
