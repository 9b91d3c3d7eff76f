/// Database layer for TaskSmash
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a connect-time health check
/// - `migrations`: embedded schema migrations
///
/// Models live in the crate-level `models` module; the `store` module wraps
/// them behind the `Store` trait.

pub mod migrations;
pub mod pool;
