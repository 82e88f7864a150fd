// Local validation - every check here runs before any remote call is issued

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const VERIFICATION_CODE_LEN: usize = 6;

static VERIFICATION_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("verification code pattern"));

static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://\S+$").expect("http url pattern"));

pub fn validate_sign_up_passwords(password: &str, confirm_password: &str) -> AppResult<()> {
    if password != confirm_password {
        return Err(AppError::Validation("Passwords do not match!".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_verification_code(code: &str) -> AppResult<()> {
    if !VERIFICATION_CODE.is_match(code) {
        return Err(AppError::Validation(format!(
            "Please enter the complete {}-digit code",
            VERIFICATION_CODE_LEN
        )));
    }
    Ok(())
}

/// Returns the trimmed comment text.
pub fn validate_comment(content: &str) -> AppResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Please write a comment".to_string()));
    }
    Ok(content.to_string())
}

/// Media and avatar references must be absolute http(s) URLs.
pub fn validate_image_url(url: &str) -> AppResult<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("Please enter an image URL".to_string()));
    }
    if !HTTP_URL.is_match(url) {
        return Err(AppError::Validation(
            "URL must start with http:// or https://".to_string(),
        ));
    }
    Ok(url.to_string())
}

pub fn validate_post_body(content: &str, media_url: Option<&str>) -> AppResult<()> {
    if content.trim().is_empty() && media_url.is_none() {
        return Err(AppError::Validation(
            "Please write something or add an image".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_profile_names(first_name: &str, last_name: &str) -> AppResult<()> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(AppError::Validation(
            "First name and last name are required".to_string(),
        ));
    }
    Ok(())
}

/// Blank optional form fields become `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        let err = validate_sign_up_passwords("abc", "abc").unwrap_err();
        assert!(err.user_message().contains("at least 6 characters"));
    }

    #[test]
    fn test_mismatched_passwords_checked_first() {
        let err = validate_sign_up_passwords("abc", "abd").unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match!");
        assert!(validate_sign_up_passwords("secret1", "secret1").is_ok());
    }

    #[test]
    fn test_verification_code_shape() {
        assert!(validate_verification_code("123456").is_ok());
        assert!(validate_verification_code("12345").is_err());
        assert!(validate_verification_code("12345a").is_err());
        assert!(validate_verification_code("1234567").is_err());
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            validate_image_url("  https://example.com/a.png ").unwrap(),
            "https://example.com/a.png"
        );
        assert!(validate_image_url("http://x.io/b.jpg").is_ok());
        let err = validate_image_url("ftp://example.com/a.png").unwrap_err();
        assert_eq!(err.user_message(), "URL must start with http:// or https://");
        let err = validate_image_url("   ").unwrap_err();
        assert_eq!(err.user_message(), "Please enter an image URL");
    }

    #[test]
    fn test_comment_and_post_bodies() {
        assert!(validate_comment("   ").is_err());
        assert_eq!(validate_comment(" hi ").unwrap(), "hi");
        assert!(validate_post_body("", None).is_err());
        assert!(validate_post_body("", Some("https://a.b/c.png")).is_ok());
        assert!(validate_post_body("hello", None).is_ok());
    }

    #[test]
    fn test_profile_names_and_blanks() {
        assert!(validate_profile_names("Ada", " ").is_err());
        assert!(validate_profile_names("Ada", "Lovelace").is_ok());
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" x ")), Some("x".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
