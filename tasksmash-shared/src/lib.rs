//! # TaskSmash Shared Library
//!
//! Domain types, persistence and business logic used by the TaskSmash API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: database models (accounts, tasks, comments, follows)
//! - `store`: the `Store` trait with PostgreSQL and in-memory backends
//! - `db`: connection pool and migrations
//! - `auth`: password hashing, signed tokens, request auth context
//! - `mail`: Mailgun client and queued outbox
//! - `services`: every domain operation
//! - `error`: domain error types

pub mod auth;
pub mod db;
pub mod error;
pub mod mail;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the TaskSmash shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
