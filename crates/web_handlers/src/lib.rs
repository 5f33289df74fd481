//! # Web Handlers for the Animal Rescue Service
//!
//! This crate provides the HTTP and websocket handlers and the route table.

/// Volunteer registration and login
mod auth_handlers;
pub use auth_handlers::*;

/// Fundraising campaigns and contributions
mod campaign_handlers;
pub use campaign_handlers::*;

/// Emergency reports
mod emergency_handlers;
pub use emergency_handlers::*;

/// Real-time chat over websocket
mod chat_handlers;
pub use chat_handlers::*;

/// Welcome and health endpoints
mod admin_handlers;
pub use admin_handlers::*;

/// Route table shared by the server and the tests
mod routes;
pub use routes::*;
