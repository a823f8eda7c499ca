//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories used when no database is configured
//! - **blob**: upload directory storage for document bytes
//! - **security**: bcrypt password hashing and JWT access tokens
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod blob;
pub mod memory;
pub mod persistence;
pub mod security;
