/// Input validators for the session and build endpoints
///
/// Required-field checks run first, then format checks, so a request
/// missing fields always gets the same message regardless of what else is
/// wrong with it.

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_USERNAME_LENGTH: usize = 64;
const MAX_NAME_LENGTH: usize = 256;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321

lazy_static! {
    // Something@something.something, no whitespace and a single @ per side
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Registration input after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login input after validation; `login` is a username or an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Build fields after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFields {
    pub build_name: String,
    pub price: String,
    pub builder: String,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn validate_registration(
    username: Option<&str>,
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<Registration, ValidationError> {
    let (Some(username), Some(name), Some(email), Some(password)) = (
        present(username),
        present(name),
        present(email),
        password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ValidationError::MissingFields);
    };

    if email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }

    validate_password(password)?;

    Ok(Registration {
        username: is_valid_username(username)?,
        name: is_valid_name(name)?,
        email: email.to_string(),
        password: password.to_string(),
    })
}

pub fn validate_credentials(
    login: Option<&str>,
    password: Option<&str>,
) -> Result<Credentials, ValidationError> {
    match (present(login), password.filter(|p| !p.is_empty())) {
        (Some(login), Some(password)) => Ok(Credentials {
            login: login.to_string(),
            password: password.to_string(),
        }),
        _ => Err(ValidationError::MissingFields),
    }
}

pub fn validate_build(
    build_name: Option<&str>,
    price: Option<&str>,
    builder: Option<&str>,
) -> Result<BuildFields, ValidationError> {
    match (present(build_name), present(price), present(builder)) {
        (Some(build_name), Some(price), Some(builder)) => Ok(BuildFields {
            build_name: build_name.to_string(),
            price: price.to_string(),
            builder: builder.to_string(),
        }),
        _ => Err(ValidationError::MissingBuildFields),
    }
}

/// Length in characters, not bytes
fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    // bcrypt only reads the first 72 bytes; the cap bounds hashing work
    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username", MAX_USERNAME_LENGTH));
    }

    if username.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("username"));
    }

    Ok(username.to_string())
}

fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name", MAX_NAME_LENGTH));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("name"));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(
        username: Option<&str>,
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Registration, ValidationError> {
        validate_registration(username, name, email, password)
    }

    #[test]
    fn test_valid_registration() {
        let registration = register(
            Some("alice"),
            Some("Alice Liddell"),
            Some(" alice@example.com "),
            Some("password123"),
        )
        .unwrap();

        assert_eq!(registration.email, "alice@example.com");
        assert_eq!(registration.password, "password123");
    }

    #[test]
    fn test_missing_fields() {
        let cases = [
            (None, Some("Alice"), Some("a@example.com"), Some("password123")),
            (Some("alice"), None, Some("a@example.com"), Some("password123")),
            (Some("alice"), Some("Alice"), Some("   "), Some("password123")),
            (Some("alice"), Some("Alice"), Some("a@example.com"), Some("")),
        ];

        for (username, name, email, password) in cases {
            assert!(matches!(
                register(username, name, email, password),
                Err(ValidationError::MissingFields)
            ));
        }
    }

    #[test]
    fn test_invalid_email_format() {
        for email in ["invalid", "user@", "@example.com", "user@@example.com", "user@example", "a b@example.com"] {
            assert!(
                matches!(
                    register(Some("alice"), Some("Alice"), Some(email), Some("password123")),
                    Err(ValidationError::InvalidEmail)
                ),
                "accepted {}",
                email
            );
        }
    }

    #[test]
    fn test_short_password_always_fails() {
        for password in ["a", "1234567", "short"] {
            assert!(matches!(
                register(Some("alice"), Some("Alice"), Some("a@example.com"), Some(password)),
                Err(ValidationError::PasswordTooShort(8))
            ));
        }

        // Exactly eight characters is enough
        assert!(register(Some("alice"), Some("Alice"), Some("a@example.com"), Some("12345678")).is_ok());
    }

    #[test]
    fn test_password_length_counts_characters() {
        // Four two-byte characters are still four characters
        assert!(validate_password("éééé").is_err());
        assert!(validate_password("éééééééé").is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert!(is_valid_username("alice_01").is_ok());
        assert!(is_valid_username("al ice").is_ok());
        assert!(is_valid_username("al\tice").is_err());
        assert!(is_valid_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_name_control_characters() {
        assert!(is_valid_name("Jean-Pierre O'Brien").is_ok());
        assert!(is_valid_name("Name\0with\0null").is_err());
    }

    #[test]
    fn test_credentials() {
        assert!(validate_credentials(Some("alice"), Some("password123")).is_ok());
        assert!(validate_credentials(Some("alice"), None).is_err());
        assert!(validate_credentials(Some(""), Some("password123")).is_err());
    }

    #[test]
    fn test_build_fields() {
        let fields = validate_build(Some("Budget Beast"), Some("$650"), Some("Sam")).unwrap();
        assert_eq!(fields.builder, "Sam");

        assert!(matches!(
            validate_build(Some("Budget Beast"), None, Some("Sam")),
            Err(ValidationError::MissingBuildFields)
        ));
    }
}
