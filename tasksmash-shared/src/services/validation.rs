/// Field rules shared by the services
///
/// Each function returns the normalized value (trimmed, lowercased where it
/// applies) or a `CoreError::Validation` naming the field.

use validator::ValidateEmail;

use crate::auth::password;
use crate::error::{CoreError, CoreResult};

pub const USERNAME_MIN_CHARS: usize = 4;
pub const USERNAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;
pub const TASK_MAX_CHARS: usize = 200;
pub const COMMENT_MAX_CHARS: usize = 500;

fn bounded(field: &'static str, value: &str, min: usize, max: usize) -> CoreResult<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if len == 0 {
        return Err(CoreError::validation(field, format!("{} cannot be empty", capitalize(field))));
    }
    if len < min || len > max {
        return Err(CoreError::validation(
            field,
            format!("{} must be between {} and {} characters", capitalize(field), min, max),
        ));
    }

    Ok(trimmed.to_string())
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 4-50 characters, surrounding whitespace dropped
pub fn username(value: &str) -> CoreResult<String> {
    bounded("username", value, USERNAME_MIN_CHARS, USERNAME_MAX_CHARS)
}

/// Syntactically valid, at most 100 characters, lowercased
pub fn email(value: &str) -> CoreResult<String> {
    let normalized = value.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(CoreError::validation("email", "Email cannot be empty"));
    }
    if normalized.chars().count() > EMAIL_MAX_CHARS {
        return Err(CoreError::validation(
            "email",
            format!("Email must be at most {} characters", EMAIL_MAX_CHARS),
        ));
    }
    if !normalized.validate_email() {
        return Err(CoreError::validation("email", "Invalid email address"));
    }

    Ok(normalized)
}

/// Non-empty, at most 128 characters; never trimmed
pub fn new_password(value: &str) -> CoreResult<()> {
    password::validate_password(value).map_err(|message| CoreError::validation("password", message))
}

/// 1-200 characters after trimming
pub fn task_content(value: &str) -> CoreResult<String> {
    bounded("content", value, 1, TASK_MAX_CHARS)
}

/// 1-500 characters after trimming
pub fn comment_content(value: &str) -> CoreResult<String> {
    bounded("content", value, 1, COMMENT_MAX_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_bounds() {
        assert_eq!(username("  alice ").unwrap(), "alice");
        assert!(username("bob").is_err());
        assert!(username(&"a".repeat(51)).is_err());
        assert!(matches!(
            username("   "),
            Err(CoreError::Validation { field: "username", ref message }) if message == "Username cannot be empty"
        ));
    }

    #[test]
    fn test_email_is_lowercased() {
        assert_eq!(email(" Alice@Example.COM ").unwrap(), "alice@example.com");
        assert_eq!(email("a@x.com").unwrap(), "a@x.com");
        assert!(email("not-an-email").is_err());
        assert!(email("").is_err());
    }

    #[test]
    fn test_content_limits() {
        assert_eq!(task_content("  water plants  ").unwrap(), "water plants");
        assert!(task_content(" \n\t ").is_err());
        assert!(task_content(&"x".repeat(201)).is_err());
        assert!(comment_content(&"x".repeat(500)).is_ok());
        assert!(comment_content(&"x".repeat(501)).is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(new_password("pw123").is_ok());
        assert!(matches!(new_password(""), Err(CoreError::Validation { field: "password", .. })));
    }
}
