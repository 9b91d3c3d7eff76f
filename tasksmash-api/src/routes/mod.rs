/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `password_reset`: Reset link request, verification and confirmation
/// - `me`: The signed-in account
/// - `dashboard`: Own, followed and suggested views
/// - `tasks`: Task CRUD
/// - `comments`: Comments and replies
/// - `follows`: Follow graph

pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod follows;
pub mod health;
pub mod me;
pub mod password_reset;
pub mod tasks;
