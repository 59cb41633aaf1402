//! Login input validation.

use crate::error::AuthError;

/// Loose structural check: one `@`, a non-empty local part, and a domain
/// with at least one inner dot. No whitespace anywhere.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(AuthError::InvalidEmail);
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(AuthError::InvalidEmail);
    }
    Ok(())
}

pub fn contains_capital_letter(password: &str) -> bool {
    password.chars().any(char::is_uppercase)
}

pub fn contains_special_character(password: &str) -> bool {
    password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

/// Password shape accepted at login. Checks run in order and the first
/// failure is reported.
pub fn validate_password(password: &str, min_length: usize) -> Result<(), AuthError> {
    if password.chars().count() < min_length {
        return Err(AuthError::PasswordTooShort { min: min_length });
    }
    if !contains_capital_letter(password) {
        return Err(AuthError::PasswordMissingCapital);
    }
    if !contains_special_character(password) {
        return Err(AuthError::PasswordMissingSpecial);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        for email in ["alice@example.com", "a.b+c@mail.example.co.uk"] {
            assert!(validate_email(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "",
            "alice",
            "@example.com",
            "alice@",
            "alice@example",
            "alice@@example.com",
            "alice@example..com",
            "al ice@example.com",
        ] {
            assert!(
                matches!(validate_email(email), Err(AuthError::InvalidEmail)),
                "{email:?}"
            );
        }
    }

    #[test]
    fn password_rules_apply_in_order() {
        assert!(matches!(
            validate_password("Sh0rt!", 8),
            Err(AuthError::PasswordTooShort { min: 8 })
        ));
        assert!(matches!(
            validate_password("lowercase!1", 8),
            Err(AuthError::PasswordMissingCapital)
        ));
        assert!(matches!(
            validate_password("Uppercase1", 8),
            Err(AuthError::PasswordMissingSpecial)
        ));
        assert!(validate_password("Passw0rd!", 8).is_ok());
    }

    #[test]
    fn eight_characters_is_long_enough() {
        assert!(validate_password("Abcdef!g", 8).is_ok());
        assert!(validate_password("Abcde!g", 8).is_err());
    }
}
