/// Authentication module
///
/// Handles JWT issuance/validation, password hashing and the session
/// cookies that carry the tokens.

mod claims;
mod cookies;
mod jwt;
mod password;

pub use claims::{AccessClaims, AuthenticatedUser, RefreshClaims};
pub use cookies::{
    clear_auth_cookies, set_auth_cookies, ACCESS_COOKIE, ACCESS_COOKIE_PATH, REFRESH_COOKIE,
    REFRESH_COOKIE_PATH,
};
pub use jwt::{issue_tokens, issue_tokens_at, validate_access_token, validate_refresh_token, TokenPair};
pub use password::{hash_password, verify_password, BCRYPT_COST};
