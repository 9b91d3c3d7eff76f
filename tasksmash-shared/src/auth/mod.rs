/// Authentication primitives for TaskSmash
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the password rules
/// - [`jwt`]: signed session and password reset tokens
/// - [`middleware`]: bearer-token extraction and the request [`middleware::AuthContext`]
///
/// # Example
///
/// ```no_run
/// use tasksmash_shared::auth::password::{hash_password, verify_password};
/// use tasksmash_shared::auth::jwt::{create_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(1, TokenType::Session), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
