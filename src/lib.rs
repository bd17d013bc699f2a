pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod middleware;
pub mod moderation;
pub mod policy;
pub mod scan;
pub mod store;
