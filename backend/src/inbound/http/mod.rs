//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod bearer;
pub mod catalogue;
pub mod error;
pub mod health;
pub mod resources;
pub mod state;

pub use error::ApiResult;
