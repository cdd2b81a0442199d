pub mod backend;
pub mod config;
pub mod error;
pub mod ratings;
pub mod recipes;
pub mod session;
pub mod state;
pub mod users;
