//! HTTP API handlers for odeon-admin

pub mod auth;
pub mod books;
pub mod health;
pub mod inquiries;
pub mod misc;
pub mod requests;
pub mod subscriptions;

pub use health::health_routes;
pub use misc::misc_routes;
