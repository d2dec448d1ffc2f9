//! Form validation helpers
//!
//! Client-side checks run before a backend round trip; the backend
//! revalidates everything. Checks return the user-facing message so
//! forms can surface it next to the field.

use std::sync::OnceLock;

use regex::Regex;

/// Minimum username length
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 6;

pub const MSG_REQUIRED: &str = "Please fill in all required fields";
pub const MSG_USERNAME_TOO_SHORT: &str = "The username must be at least 3 characters";
pub const MSG_PASSWORD_TOO_SHORT: &str = "The password must be at least 6 characters";
pub const MSG_PASSWORDS_DIFFER: &str = "The passwords do not match";
pub const MSG_BAD_EMAIL: &str = "Enter a valid email address";
pub const MSG_BAD_CODE: &str = "The code must be exactly 6 digits";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"))
}

fn join_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{6}$").expect("join code regex"))
}

/// Whether `email` has the shape of an email address
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Whether `code` is a six-digit tournament join code
pub fn is_valid_join_code(code: &str) -> bool {
    join_code_regex().is_match(code)
}

/// Check a username, returning the message to show on failure
pub fn check_username(username: &str) -> Result<(), &'static str> {
    if username.trim().is_empty() {
        return Err(MSG_REQUIRED);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(MSG_USERNAME_TOO_SHORT);
    }
    Ok(())
}

/// Check a password, returning the message to show on failure
pub fn check_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err(MSG_REQUIRED);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MSG_PASSWORD_TOO_SHORT);
    }
    Ok(())
}

/// Check a password confirmation pair
pub fn check_passwords_match(password: &str, confirmation: &str) -> Result<(), &'static str> {
    if password != confirmation {
        return Err(MSG_PASSWORDS_DIFFER);
    }
    Ok(())
}

/// Check an email address, returning the message to show on failure
pub fn check_email(email: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err(MSG_REQUIRED);
    }
    if !is_valid_email(email) {
        return Err(MSG_BAD_EMAIL);
    }
    Ok(())
}

/// Check a tournament join code, returning the message on failure
pub fn check_join_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err(MSG_REQUIRED);
    }
    if !is_valid_join_code(code) {
        return Err(MSG_BAD_CODE);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_username_boundaries() {
        assert_eq!(check_username(""), Err(MSG_REQUIRED));
        assert_eq!(check_username("   "), Err(MSG_REQUIRED));
        assert_eq!(check_username("ab"), Err(MSG_USERNAME_TOO_SHORT));
        assert_eq!(check_username("bob"), Ok(()));
    }

    #[test]
    fn test_check_password_boundaries() {
        assert_eq!(check_password(""), Err(MSG_REQUIRED));
        assert_eq!(check_password("12345"), Err(MSG_PASSWORD_TOO_SHORT));
        assert_eq!(check_password("123456"), Ok(()));
    }

    #[test]
    fn test_check_passwords_match() {
        assert_eq!(check_passwords_match("secret1", "secret1"), Ok(()));
        assert_eq!(
            check_passwords_match("secret1", "secret2"),
            Err(MSG_PASSWORDS_DIFFER)
        );
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("bob@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("bob"));
        assert!(!is_valid_email("bob@example"));
        assert!(!is_valid_email("bob @example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_check_email_messages() {
        assert_eq!(check_email(""), Err(MSG_REQUIRED));
        assert_eq!(check_email("not-an-email"), Err(MSG_BAD_EMAIL));
        assert_eq!(check_email("bob@example.com"), Ok(()));
    }

    #[test]
    fn test_join_code_shapes() {
        assert!(is_valid_join_code("123456"));
        assert!(!is_valid_join_code("12345"));
        assert!(!is_valid_join_code("1234567"));
        assert!(!is_valid_join_code("12345a"));
        assert_eq!(check_join_code(""), Err(MSG_REQUIRED));
        assert_eq!(check_join_code("abc"), Err(MSG_BAD_CODE));
        assert_eq!(check_join_code("654321"), Ok(()));
    }
}
